//! Login command implementation.

use anyhow::Result;

use crate::AuthArgs;
use crate::session::connect;

/// Establish a session and report where its tokens were stored.
pub(crate) async fn login(auth: &AuthArgs, force: bool, quiet: bool) -> Result<()> {
    let client = connect(auth, force, quiet).await?;

    if !quiet {
        println!("Session ready for {}", client.session().client_code);
        match client.cache() {
            Some(cache) => println!("Tokens stored in: {}", cache.path().display()),
            None => println!("Token cache disabled; tokens were not stored"),
        }
    }

    Ok(())
}
