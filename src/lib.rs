pub mod cache;
pub mod comment;
pub mod config;
pub mod db;
pub mod filesystem;
pub mod follow;
pub mod group;
pub mod middleware;
pub mod orm;
pub mod post;
pub mod session;
pub mod template;
pub mod user;
pub mod web;
