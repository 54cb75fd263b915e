use std::fmt::{self, Write};

use phrasehunt::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Bare HTML fragments, enough to play from a browser console.
struct HtmlPages;

impl PageRenderer for HtmlPages {
    fn render(&self, page: Page<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        write_page(&mut out, page).map_err(|e| RenderError::Template {
            template: page.name(),
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}

fn write_page(out: &mut impl Write, page: Page<'_>) -> fmt::Result {
    match page {
        Page::Home => write!(
            out,
            "<h1>Phrase Hunt</h1>\
             <button id=\"create\">New room</button>\
             <button id=\"join\">Join room</button>"
        ),
        Page::JoinRoom => write!(
            out,
            "<input id=\"code\" maxlength=\"4\"><button id=\"submit-code\">Join</button>"
        ),
        Page::Room(view) => {
            write!(out, "<h2>Room {}</h2><ul>", view.code)?;
            for name in &view.players {
                write!(out, "<li>{}</li>", escape(name))?;
            }
            write!(out, "</ul><button id=\"start\">Start</button>")
        }
        Page::Game(view) => write!(
            out,
            "<h2>{}</h2><input id=\"word\"><div id=\"records\"></div>",
            escape(&view.phrase)
        ),
        Page::Scoreboard(view) => {
            write!(out, "<ol>")?;
            for s in &view.standings {
                write!(
                    out,
                    "<li>{} {} ({})</li>",
                    escape(&s.name),
                    s.score,
                    s.words.len()
                )?;
            }
            write!(out, "</ol>")
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn setup_logger() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();

    let bind = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PHRASEHUNT_BIND").ok())
        .unwrap_or_else(|| ServerConfig::default().bind_addr);

    let server = PhraseHuntServer::builder()
        .bind(&bind)
        .renderer(HtmlPages)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run().await?;
    Ok(())
}
