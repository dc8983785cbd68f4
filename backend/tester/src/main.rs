use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::{Map, Value};

/// Posts a sample application to a running backend.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:3001")]
    url: String,

    #[arg(long, default_value = "jo.doe@example.com")]
    email: String,

    #[arg(long, default_value = "Jo")]
    first_name: String,

    #[arg(long, default_value = "Doe")]
    last_name: String,

    #[arg(long, default_value = "US")]
    country: String,

    /// Extra `key=value` search filter, repeatable.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got {raw}"))?;

    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn build_body(args: &Args) -> Value {
    let mut body = Map::new();

    body.insert("email".into(), args.email.clone().into());
    body.insert("firstName".into(), args.first_name.clone().into());
    body.insert("lastName".into(), args.last_name.clone().into());
    body.insert("country".into(), args.country.clone().into());

    for (key, value) in &args.filters {
        body.insert(key.clone(), value.clone().into());
    }

    Value::Object(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let body = build_body(&args);

    println!("{}", serde_json::to_string_pretty(&body)?);

    let endpoint = format!("{}/api/submit-application", args.url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("failed to reach {endpoint}"))?;

    let status = response.status();
    let text = response.text().await?;

    println!("{status}");
    println!("{text}");

    Ok(())
}
