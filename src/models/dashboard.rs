//! Role dashboards

use serde::Serialize;
use utoipa::ToSchema;

use super::{game::Game, rental::RentalDetails, user::UserShort};

/// Super admin view: everything, rentals newest first
#[derive(Debug, Serialize, ToSchema)]
pub struct SuperAdminDashboard {
    pub users: Vec<UserShort>,
    pub games: Vec<Game>,
    pub rentals: Vec<RentalDetails>,
}

/// Student admin view: own games and the rentals of those games
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentAdminDashboard {
    pub games: Vec<Game>,
    pub rentals: Vec<RentalDetails>,
}

/// Student view: rentable games and own rentals
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentDashboard {
    pub games: Vec<Game>,
    pub rentals: Vec<RentalDetails>,
}

/// Dashboard matching the requester's role
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dashboard {
    SuperAdmin(SuperAdminDashboard),
    StudentAdmin(StudentAdminDashboard),
    Student(StudentDashboard),
}
