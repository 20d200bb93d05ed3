use anyhow::{Result, anyhow};
use vetanemia_core::ProfileUpdate;
use vetanemia_session::Route;

use crate::app::App;
use crate::cli::{OutputFormat, ProfileUpdateArgs};
use crate::commands::dashboard::print_header;
use crate::output::{print_field, print_json, print_success};

pub async fn show(app: &App) -> Result<()> {
    let page = app.mount(Route::Profile).await?;
    if app.format == OutputFormat::Json {
        return print_json(&page.user);
    }
    print_header(app, Route::Profile);
    let user = &page.user;
    print_field("First name", &user.first_name);
    print_field("Last name", &user.last_name);
    print_field("Email", &user.email);
    print_field("Role", &user.role);
    print_field("Clinic ID", &user.clinic_id);
    Ok(())
}

fn apply(mut update: ProfileUpdate, args: &ProfileUpdateArgs) -> ProfileUpdate {
    let fields = [
        (&mut update.first_name, &args.first_name),
        (&mut update.last_name, &args.last_name),
        (&mut update.email, &args.email),
        (&mut update.role, &args.role),
        (&mut update.clinic_id, &args.clinic_id),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    }
    update
}

pub async fn update(app: &App, args: &ProfileUpdateArgs) -> Result<()> {
    let page = app.mount(Route::Profile).await?;
    let update = apply(page.user.to_profile_update(), args);
    if update == page.user.to_profile_update() {
        println!("Nothing to update.");
        return Ok(());
    }

    let user = page
        .client
        .update_profile(&update)
        .await
        .map_err(|e| anyhow!(e.user_message("Profile update")))?;
    app.session.replace_user(user.clone())?;

    if app.format == OutputFormat::Json {
        return print_json(&user);
    }
    print_success(&format!("Profile updated for {}", user.display_name()));
    Ok(())
}
