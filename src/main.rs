use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chat_render::badge::{BadgeKind, BadgeTable};
use chat_render::color::{ColorScheme, Rgba};
use chat_render::font::{ChatFontSystem, FontConfig, FontKind};
use chat_render::geom::{Point, Rect};
use chat_render::message::{Message, Selection, Word};
use chat_render::render::{MessageCompositor, RenderMode, Surface, TextRenderer};
use chat_render::size_cache::SizeCaches;

/// Render a sample chat message to a PNG.
#[derive(Parser, Debug)]
#[command(name = "chat-render")]
struct Args {
    /// Output PNG path.
    #[arg(long, default_value = "message.png")]
    out: PathBuf,

    /// Message text (split into words at spaces).
    #[arg(long, default_value = "hello from the chat renderer")]
    text: String,

    /// Theme: dark or light.
    #[arg(long, default_value = "dark")]
    theme: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let scheme = match args.theme.as_str() {
        "light" => ColorScheme::light(),
        _ => ColorScheme::dark(),
    };

    let fonts = Arc::new(Mutex::new(ChatFontSystem::new(FontConfig::default())));
    let text = TextRenderer::new(fonts);
    let compositor =
        MessageCompositor::new(scheme.clone(), text, SizeCaches::default(), RenderMode::Buffered);

    let badges = BadgeTable::load();
    let line_height = compositor.measure(FontKind::Medium, "M").height.max(16);

    // Lay the words out on one line: badge first, then the text words.
    let mut words = Vec::new();
    let mut x = 4i32;
    if let Some(badge) = badges.get(BadgeKind::Moderator) {
        let rect = Rect::new(x, 2, badge.width(), badge.height());
        words.push(Word::image(rect, badge.clone()));
        x = rect.right() + 4;
    }
    let name_color = Some(Rgba::rgb(30, 80, 200));
    for (i, token) in args.text.split_whitespace().enumerate() {
        let size = compositor.measure(FontKind::Medium, token);
        let rect = Rect::new(x, 2, size.width, size.height);
        let color = if i == 0 { name_color } else { None };
        words.push(Word::text(rect, token, FontKind::Medium, color));
        x = rect.right() + compositor.measure(FontKind::Medium, " ").width as i32;
    }

    let width = (x as u32).max(64) + 4;
    let height = line_height + 4;
    let mut message = Message::new(words, width, height);

    let mut surface = Surface::new(width + 8, height + 8, scheme.background);
    compositor.draw(&mut surface, &mut message, Point::new(4, 4), Selection::EMPTY, 0);

    surface.save_png(&args.out)?;
    tracing::info!(out = %args.out.display(), "rendered message");
    Ok(())
}
