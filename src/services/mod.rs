//! Business logic services

pub mod dashboard;
pub mod email;
pub mod games;
pub mod password_reset;
pub mod profile;
pub mod redis;
pub mod rentals;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub games: games::GamesService,
    pub rentals: rentals::RentalsService,
    pub dashboard: dashboard::DashboardService,
    pub profile: profile::ProfileService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, redis_service: redis::RedisService) -> Self {
        let password_reset = password_reset::PasswordResetService::new(
            Arc::new(redis_service),
            Arc::new(email::EmailService::new(config.email.clone())),
            config.password_reset.clone(),
        );

        Self {
            users: users::UsersService::new(repository.clone(), config.auth.clone(), password_reset),
            games: games::GamesService::new(repository.clone()),
            rentals: rentals::RentalsService::new(repository.clone(), config.rentals.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            profile: profile::ProfileService::new(repository.clone()),
            repository,
        }
    }
}
