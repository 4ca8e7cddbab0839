//! `whatsorder`: command-line companion for WhatsOrder forms.
//!
//! # Usage
//!
//! ```text
//! whatsorder encode "Tea=20" "Coffee=30=https://x.com/c.jpg"
//! whatsorder encode --compact --json products.json
//! whatsorder decode "Tea-20,Coffee-30"
//! whatsorder link --biz "Cafe Blue" --phone 9876543210 "Tea=20"
//! whatsorder resolve --slug cafe-blue --url http://localhost:8080
//! whatsorder list --uid alice
//! ```

mod client;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, FormQuery};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use whatsorder_codec::link;
use whatsorder_core::{
  form::EphemeralForm,
  product::{Product, ProductList},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "whatsorder", about = "Encode, decode and resolve WhatsOrder forms")]
struct Args {
  /// Path to a TOML config file (url, uid, identity_header).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the form server (default: http://localhost:8080).
  #[arg(long, env = "WHATSORDER_URL", global = true)]
  url: Option<String>,

  /// Caller uid to act as.
  #[arg(long, env = "WHATSORDER_UID", global = true)]
  uid: Option<String>,

  #[command(subcommand)]
  command: Command,
}

/// Products given either as `NAME=PRICE[=IMAGE]` arguments or a JSON file.
#[derive(clap::Args, Debug)]
struct ProductArgs {
  /// `NAME=PRICE` or `NAME=PRICE=IMAGE`.
  products: Vec<String>,

  /// Read a JSON array of products instead (`-` for stdin).
  #[arg(long, value_name = "FILE", conflicts_with = "products")]
  json: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Encode a product list for a share link.
  Encode {
    #[command(flatten)]
    products: ProductArgs,

    /// Emit the compact `v2:` format.
    #[arg(long)]
    compact: bool,
  },

  /// Decode a product list in either format.
  Decode {
    encoded: String,
  },

  /// Print the share link and WhatsApp share link for an unsaved form.
  Link {
    #[arg(long)]
    biz: String,

    #[arg(long)]
    phone: String,

    #[command(flatten)]
    products: ProductArgs,
  },

  /// Resolve a form on the server.
  Resolve {
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    biz: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Encoded product list.
    #[arg(long)]
    products: Option<String>,

    /// Resolve for editing rather than viewing.
    #[arg(long)]
    edit: bool,
  },

  /// List the caller's forms on the server.
  List,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:             String,
  #[serde(default)]
  uid:             String,
  #[serde(default)]
  identity_header: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:        args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    uid:             args
      .uid
      .or_else(|| (!file_cfg.uid.is_empty()).then(|| file_cfg.uid.clone()))
      .unwrap_or_default(),
    identity_header: if file_cfg.identity_header.is_empty() {
      "x-caller-uid".to_string()
    } else {
      file_cfg.identity_header.clone()
    },
  };

  match args.command {
    Command::Encode { products, compact } => {
      let products = products.load()?;
      let encoded = if compact {
        whatsorder_codec::encode_compact(&products)
      } else {
        whatsorder_codec::encode(&products)
      };
      println!("{encoded}");
    }
    Command::Decode { encoded } => {
      let decoded = whatsorder_codec::decode_any(&encoded);
      for r in &decoded.rejected {
        tracing::warn!(index = r.index, raw = %r.raw, "{}", r.reason);
      }
      println!("{}", serde_json::to_string_pretty(&decoded.products)?);
    }
    Command::Link { biz, phone, products } => {
      let form = EphemeralForm {
        business_name: biz,
        phone_number:  phone,
        products:      products.load()?,
      };
      let url = link::absolute(&api_config.base_url, &link::ephemeral_share_path(&form));
      println!("{url}");
      println!(
        "{}",
        link::whatsapp_share_link(&link::share_message(&form.business_name, &url))
      );
    }
    Command::Resolve { id, slug, biz, phone, products, edit } => {
      let client = ApiClient::new(api_config)?;
      let query = FormQuery { id, slug, biz, phone, products, edit };
      let form = client.resolve(&query).await?;
      println!("{}", serde_json::to_string_pretty(&form)?);
    }
    Command::List => {
      if api_config.uid.is_empty() {
        bail!("listing forms requires --uid");
      }
      let client = ApiClient::new(api_config)?;
      println!("{}", serde_json::to_string_pretty(&client.list().await?)?);
    }
  }

  Ok(())
}

// ─── Product input ────────────────────────────────────────────────────────────

impl ProductArgs {
  fn load(&self) -> Result<ProductList> {
    let products = match &self.json {
      Some(path) => read_json(path)?,
      None => self.products.iter().map(|s| parse_product(s)).collect::<Result<_>>()?,
    };
    for (i, p) in products.iter().enumerate() {
      whatsorder_core::product::validate(&p.name, p.price)
        .map_err(|e| anyhow!("product {i}: {e}"))?;
    }
    Ok(products)
  }
}

fn read_json(path: &Path) -> Result<ProductList> {
  let raw = if path == Path::new("-") {
    std::io::read_to_string(std::io::stdin()).context("reading stdin")?
  } else {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
  };
  serde_json::from_str(&raw).context("parsing product JSON")
}

/// `NAME=PRICE` or `NAME=PRICE=IMAGE`; the image may itself contain `=`.
fn parse_product(arg: &str) -> Result<Product> {
  let mut parts = arg.splitn(3, '=');
  let name = parts.next().unwrap_or_default().trim();
  let price = parts
    .next()
    .ok_or_else(|| anyhow!("{arg:?}: expected NAME=PRICE[=IMAGE]"))?
    .trim();
  let price: f64 = price
    .parse()
    .with_context(|| format!("{arg:?}: invalid price {price:?}"))?;

  let product = Product::new(name, price).with_context(|| format!("{arg:?}"))?;
  Ok(match parts.next().map(str::trim).filter(|s| !s.is_empty()) {
    Some(image) => product.with_image(image),
    None => product,
  })
}
