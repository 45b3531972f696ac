use crate::domain::constants::LOGIN_ROUTE;
use crate::domain::models::{JsonOut, RedirectOut};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

/// Like `print_out`, but an empty list renders `empty` instead of nothing.
pub fn print_list<T: Serialize>(
    json: bool,
    data: &[T],
    empty: &str,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if !json && data.is_empty() {
        println!("{empty}");
        return Ok(());
    }
    print_out(json, data, row)
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

pub fn print_redirect(json: bool) -> anyhow::Result<()> {
    if json {
        let out = RedirectOut {
            ok: false,
            redirect: LOGIN_ROUTE.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        eprintln!("login required: run `policyguard {LOGIN_ROUTE}`");
    }
    Ok(())
}
