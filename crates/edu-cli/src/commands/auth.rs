use anyhow::{anyhow, Result};
use edu_interaction::dto::RegisterRequest;

use super::App;

pub async fn health(app: &App) -> Result<()> {
    let api = app.session.api();
    let response = api
        .health(true)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    let status = if response.status.is_empty() { "ok" } else { response.status.as_str() };
    println!("{} ({})", status, api.client().active_address());
    Ok(())
}

pub async fn register(
    app: &App,
    name: String,
    email: String,
    password: String,
    role: Option<String>,
    department: Option<String>,
) -> Result<()> {
    let request = RegisterRequest {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password,
        role,
        department,
    };
    let user = app
        .session
        .identity()
        .register(&request)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    println!("Registered and signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let user = app
        .session
        .identity()
        .login(email, password)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub fn logout(app: &App) {
    app.session.identity().logout();
    println!("Signed out");
}

pub async fn whoami(app: &App) {
    let identity = app.session.identity();
    identity.bootstrap().await;

    match identity.user() {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            if !user.role.is_empty() {
                println!("role: {}", user.role);
            }
            if !user.department.is_empty() {
                println!("department: {}", user.department);
            }
        }
        None if identity.is_authenticated() => println!("Signed in (profile unavailable)"),
        None => println!("Not signed in (history is stored as guest)"),
    }
}
