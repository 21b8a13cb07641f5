pub mod analytics;
pub mod credentials;
pub mod guard;
pub mod token;

pub use credentials::{CredentialError, CredentialStore};
pub use guard::{AuthError, AuthorizationGuard, LikesPolicy, OwnershipLookup};
pub use token::{TokenConfig, TokenError, TokenService};

pub mod blog_service;
pub mod blog_service_impl;
pub use blog_service::{BlogError, BlogInput, BlogService, BlogWithOwner};
pub use blog_service_impl::SeaOrmBlogService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{LoginResult, UserError, UserInput, UserService, UserWithBlogs};
pub use user_service_impl::SeaOrmUserService;
