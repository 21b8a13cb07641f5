//! Create user command handler

use crate::config::Config;
use crate::services::UserInput;
use crate::state::SharedState;

pub async fn cmd_create_user(
    config: Config,
    username: String,
    name: Option<String>,
    password: String,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let user = state
        .user_service
        .register(UserInput {
            username: Some(username),
            name,
            password: Some(password),
        })
        .await?;

    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}
