//! Application layer
//!
//! Contains the use cases. Services validate primitive input into value
//! objects, load aggregates through the repository ports, apply the
//! mutation and persist the result.

pub mod dto;
pub mod group_service;
mod membership;
pub mod user_service;

pub use dto::{
    CreateGroupInput, CreateUserInput, GroupResponse, UpdateGroupInput, UpdateUserInput,
    UserResponse,
};
pub use group_service::GroupService;
pub use user_service::UserService;
