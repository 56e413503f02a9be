//! Profile command implementation.

use anyhow::{Context, Result};
use smartconnect_lib::cancellable;

use crate::AuthArgs;
use crate::session::{connect, interrupted};

/// Show the account profile of the current session.
pub(crate) async fn show_profile(auth: &AuthArgs, quiet: bool) -> Result<()> {
    let client = connect(auth, false, quiet).await?;
    // A session restored from the cache was validated with this same request.
    let profile = match client.probed_profile() {
        Some(profile) => profile.clone(),
        None => cancellable(client.profile(), interrupted())
            .await
            .context("Failed to fetch profile")?,
    };

    println!("Client Code: {}", profile.client_code);
    println!("Name:        {}", profile.name);
    if !profile.email.is_empty() {
        println!("Email:       {}", profile.email);
    }
    if !profile.mobile_no.is_empty() {
        println!("Mobile:      {}", profile.mobile_no);
    }
    println!("Broker:      {}", profile.broker_id);
    println!("Exchanges:   {}", profile.exchanges.join(", "));
    println!("Products:    {}", profile.products.join(", "));
    if !profile.last_login_time.is_empty() {
        println!("Last Login:  {}", profile.last_login_time);
    }

    Ok(())
}
