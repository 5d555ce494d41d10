//! Role dashboards

use crate::{
    error::AppResult,
    models::{
        access::Viewer,
        dashboard::{Dashboard, StudentAdminDashboard, StudentDashboard, SuperAdminDashboard},
        user::Role,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard matching the viewer's role
    pub async fn for_viewer(&self, viewer: &Viewer) -> AppResult<Dashboard> {
        Ok(match viewer.role {
            Role::SuperAdmin => Dashboard::SuperAdmin(self.super_admin(viewer).await?),
            Role::StudentAdmin => Dashboard::StudentAdmin(self.student_admin(viewer).await?),
            Role::Student => Dashboard::Student(self.student(viewer).await?),
        })
    }

    pub async fn super_admin(&self, viewer: &Viewer) -> AppResult<SuperAdminDashboard> {
        viewer.require_super_admin()?;

        Ok(SuperAdminDashboard {
            users: self.repository.users.list_all().await?,
            games: self.repository.games.list_all().await?,
            rentals: self.repository.rentals.list_all().await?,
        })
    }

    pub async fn student_admin(&self, viewer: &Viewer) -> AppResult<StudentAdminDashboard> {
        viewer
            .can_view_admin_dashboard()
            .or_forbidden("Game administrator privileges required")?;

        Ok(StudentAdminDashboard {
            games: self.repository.games.list_by_owner(viewer.user_id).await?,
            rentals: self
                .repository
                .rentals
                .list_by_game_owner(viewer.user_id)
                .await?,
        })
    }

    pub async fn student(&self, viewer: &Viewer) -> AppResult<StudentDashboard> {
        Ok(StudentDashboard {
            games: self.repository.games.list_available().await?,
            rentals: self.repository.rentals.list_by_user(viewer.user_id).await?,
        })
    }
}
