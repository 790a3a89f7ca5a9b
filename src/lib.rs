pub mod app;
pub mod config;
pub mod demo_seeder;
pub mod error;
pub mod api {
    pub mod documents;
    pub mod errors;
    pub mod graph;
    pub mod pages;
    pub mod session;
}
pub mod auth {
    pub mod config;
    pub mod demo_auth;
    pub mod models;
    pub mod oidc;
    pub mod session;
}
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod repository;
    pub mod user_repository;
}
pub mod models {
    pub mod document;
}
pub mod rendering {
    pub mod graph;
    pub mod links;
    pub mod markdown;
    pub mod pages;
}
