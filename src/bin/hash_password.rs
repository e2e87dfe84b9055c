//! Print an argon2id hash for `auth.admin_password_hash`.
//!
//! Usage: `hash-password <password>`, or pipe the password on stdin.

use std::io::BufRead;

use vitrine::services::password::hash_password;

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        anyhow::bail!("refusing to hash an empty password");
    }

    println!("{}", hash_password(&password)?);
    Ok(())
}
