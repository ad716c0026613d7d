//! `/sauce [query]`: finds the anime a frame comes from
//!
//! The image is taken from, in order: a link to an image, a link to a
//! message (or a bare message id in the current channel), the message being
//! replied to, and the attachments of the invoking message. The lookup itself
//! is done by trace.moe.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::application::context::CommandContext;
use crate::application::errors::CommandError;
use crate::domain::entities::reply::{container, message, ViewBuilder};
use crate::domain::entities::{Button, Command, CommandOption, Reply};
use crate::domain::traits::CommandHandler;

pub const NAME: &str = "sauce";

pub fn command() -> Command {
    Command::new(NAME)
        .with_description("Finds anime based on the specified frame from it")
        .with_usage("[message link | message id | image link]")
        .with_option(CommandOption::new("query", "Link to the message or its ID"))
        .with_handler(Sauce)
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub result: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub anilist: AniList,
    #[serde(default)]
    pub episode: Value,
    pub from: f64,
    pub to: f64,
    pub similarity: f64,
    pub video: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniList {
    pub id_mal: Option<u64>,
    pub title: Titles,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub is_adult: bool,
    #[serde(default)]
    pub genres: Vec<String>,
    pub season: Option<String>,
    pub start_date: Option<StartDate>,
}

#[derive(Debug, Deserialize)]
pub struct Titles {
    pub native: Option<String>,
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartDate {
    pub year: Option<i32>,
}

/// Where the image to look up was found, or which error to show
#[derive(Debug, PartialEq, Eq)]
enum Image {
    Found(String),
    Missing(&'static str),
}

pub struct Sauce;

#[async_trait]
impl CommandHandler for Sauce {
    async fn execute(&self, ctx: &CommandContext) -> Result<Reply, CommandError> {
        let image_url = match find_image(ctx, ctx.arg("query").as_deref()).await {
            Image::Found(url) => url,
            Image::Missing(error) => return Ok(ctx.error_reply(None, Some(&ctx.i(error, &[])), &[])),
        };

        let config = &ctx.state.config.sauce;
        let response = search(ctx.state.http(), &config.endpoint, &image_url).await?;
        if !response.error.is_empty() {
            return Ok(Reply::text(format!("```py\n{}\n```", response.error)));
        }

        match response.result.first() {
            Some(result) if result.similarity >= config.min_similarity => Ok(render(ctx, result)),
            _ => Ok(ctx.error_reply(None, Some(&ctx.i("errors.not_similar_enough", &[])), &[])),
        }
    }
}

async fn find_image(ctx: &CommandContext, query: Option<&str>) -> Image {
    let parsed = query.and_then(parse_url);

    let linked = match (&parsed, query) {
        (Some(url), _) if is_discord(url) => message_link(url),
        (_, Some(query)) if !query.is_empty() && query.chars().all(|c| c.is_ascii_digit()) => {
            query.parse().ok().map(|id| (ctx.channel_id, id))
        }
        _ => None,
    };

    if let Some((channel_id, message_id)) = linked {
        return match ctx.bot.fetch_message(channel_id, message_id).await {
            Ok(message) => match message.first_attachment_url() {
                Some(url) => Image::Found(url.to_string()),
                None => Image::Missing("errors.no_attachments_by_url"),
            },
            Err(e) => {
                tracing::debug!(target: "commands", "Failed to fetch message {}: {}", message_id, e);
                Image::Missing("errors.message_not_found")
            }
        };
    }

    if let (Some(_), Some(query)) = (&parsed, query) {
        return Image::Found(query.to_string());
    }

    let Some(invoking) = &ctx.message else {
        return Image::Missing("errors.no_image");
    };

    if let Some(reference) = invoking.reference {
        return match ctx.bot.fetch_message(reference.channel_id, reference.message_id).await {
            Ok(message) => match message.first_attachment_url() {
                Some(url) => Image::Found(url.to_string()),
                None => Image::Missing("errors.no_attachments_by_reference"),
            },
            Err(e) => {
                tracing::debug!(target: "commands", "Failed to fetch replied message: {}", e);
                Image::Missing("errors.message_not_found")
            }
        };
    }

    match invoking.first_attachment_url() {
        Some(url) => Image::Found(url.to_string()),
        None => Image::Missing("errors.no_image"),
    }
}

pub async fn search(client: &reqwest::Client, endpoint: &str, image_url: &str) -> Result<SearchResponse, CommandError> {
    let url = search_url(endpoint, image_url);
    tracing::debug!(target: "commands", "Searching for sauce: {}", url);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| CommandError::ExecutionFailed(format!("trace.moe request failed: {}", e)))?;

    response
        .json::<SearchResponse>()
        .await
        .map_err(|e| CommandError::ExecutionFailed(format!("trace.moe returned invalid JSON: {}", e)))
}

/// The endpoint with `{url}` replaced by the form-encoded image URL
pub fn search_url(endpoint: &str, image_url: &str) -> String {
    endpoint.replace("{url}", &quote_plus(image_url))
}

fn quote_plus(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

fn render(ctx: &CommandContext, result: &SearchResult) -> Reply {
    let anilist = &result.anilist;
    let (main_title, other_titles) = titles(anilist);

    let genres: Vec<String> = anilist
        .genres
        .iter()
        .map(|g| format!("`{}`", ctx.i18n().get_text(&format!("genres.{}", g.to_lowercase()), Some(g), &[])))
        .collect();

    let mut notes = Vec::new();
    if let Some(season) = &anilist.season {
        let season = ctx.i(&format!("result.seasons.{}", season.to_lowercase()), &[]);
        match anilist.start_date.as_ref().and_then(|d| d.year) {
            Some(year) => notes.push(format!("{} {}", season, year)),
            None => notes.push(season),
        }
    }
    if anilist.is_adult {
        notes.push(ctx.i("result.notes.adult", &[]));
    }
    let notes: Vec<String> = notes.iter().map(|n| format!("`{}`", n)).collect();

    let title = format!("`{}`", main_title);
    let mut page = container(None)
        .text(format!("### {}", ctx.i("result.title", &[])))
        .gallery(vec![preview_url(&result.video)])
        .text(format!(
            "{}\n{}\n{}",
            ctx.i("result.fields.title", &[("title", title.as_str())]),
            ctx.i("result.fields.genres", &[("genres", genres.join(", ").as_str())]),
            ctx.i("result.fields.notes", &[("notes", notes.join(", ").as_str())]),
        ));

    if let Some(id) = anilist.id_mal {
        page = page.action_row(vec![Button::link(
            ctx.i("result.buttons.myanimelist", &[]),
            format!("https://myanimelist.net/anime/{}", id),
        )]);
    }

    if !other_titles.is_empty() {
        let list: Vec<String> = other_titles.iter().map(|t| format!("- `{}`", t)).collect();
        page = page
            .separator()
            .text(format!("{}\n{}", ctx.i("result.fields.other_titles", &[]), list.join("\n")));
    }

    let similarity = format!("`{:.1}%`", result.similarity * 100.0);
    let episode = format!(
        "`{}`",
        episode(&result.episode).unwrap_or_else(|| ctx.i18n().get_text("none.var2", None, &[]))
    );
    let frame = format!("`{}` - `{}`", format_time(result.from), format_time(result.to));

    let page = page.separator().text(format!(
        "### {}\n{}\n{}\n{}",
        ctx.i("result.metadata", &[]),
        ctx.i("result.fields.similarity", &[("similarity", similarity.as_str())]),
        ctx.i("result.fields.episode", &[("episode", episode.as_str())]),
        ctx.i("result.fields.frame", &[("frame", frame.as_str())]),
    ));

    message().container(page).build()
}

/// Parses `value` as an absolute http(s) URL with a host
pub fn parse_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;
    Some(url)
}

/// `discord.com` or any of its subdomains (`ptb.`, `canary.`)
pub fn is_discord(url: &Url) -> bool {
    url.host_str()
        .map_or(false, |host| host == "discord.com" || host.ends_with(".discord.com"))
}

/// Channel and message ids from `https://discord.com/channels/<guild>/<channel>/<message>`
pub fn message_link(url: &Url) -> Option<(u64, u64)> {
    let parts: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match parts.as_slice() {
        ["channels", _guild, channel, message] => Some((channel.parse().ok()?, message.parse().ok()?)),
        _ => None,
    }
}

/// The main title (romaji, else english, else native) and every other distinct title
pub fn titles(anilist: &AniList) -> (String, Vec<String>) {
    let t = &anilist.title;
    let candidates = [&t.native, &t.romaji, &t.english];
    let main = [&t.romaji, &t.english, &t.native]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default();

    let mut others: Vec<String> = Vec::new();
    let extra = candidates.into_iter().flatten().chain(anilist.synonyms.iter());
    for title in extra {
        if !title.is_empty() && *title != main && !others.contains(title) {
            others.push(title.clone());
        }
    }

    (main, others)
}

/// `HH:MM:SS.ss`
pub fn format_time(time: f64) -> String {
    let hundredths = (time.max(0.0) * 100.0).round() as u64;
    let seconds = hundredths / 100;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60,
        hundredths % 100
    )
}

fn episode(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => {
            Some(items.iter().filter_map(episode).collect::<Vec<_>>().join("-"))
        }
        _ => None,
    }
}

fn preview_url(video: &str) -> String {
    let separator = if video.contains('?') { '&' } else { '?' };
    format!("{}{}size=l", video, separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::application::state::BotState;
    use crate::domain::entities::{Attachment, Message, User};
    use crate::domain::traits::{Bot, BotInfo};
    use crate::infrastructure::config::{Config, Design, YamlMapping};
    use crate::infrastructure::i18n::{LocalizationPackage, LocalizationProvider};
    use std::sync::Arc;

    const RESPONSE: &str = r#"{
        "frameCount": 745506,
        "error": "",
        "result": [{
            "anilist": {
                "id": 99939,
                "idMal": 34658,
                "title": {"native": "ネコぱらOVA", "romaji": "Nekopara OVA", "english": null},
                "synonyms": ["Neko Para OVA", "Nekopara OVA"],
                "isAdult": false,
                "genres": ["Comedy", "Slice of Life"],
                "season": "SUMMER",
                "startDate": {"year": 2017, "month": 7, "day": 31}
            },
            "filename": "Nekopara - OVA (BD 1280x720 x264 AAC).mp4",
            "episode": null,
            "from": 97.75,
            "to": 98.92,
            "similarity": 0.9440424588727485,
            "video": "https://api.trace.moe/video/99939/Nekopara.mp4?t=98.335&now=1653892514",
            "image": "https://api.trace.moe/image/99939/Nekopara.mp4.jpg?t=98.335"
        }]
    }"#;

    const ENGLISH: &str = r#"
natural_name: English
discord_locale: en-US
authors: [{name: tester}]
none:
  var2: none
genres:
  comedy: Comedy
commands:
  sauce:
    errors:
      no_image: No image
      no_attachments_by_url: That message has no attachments
      no_attachments_by_reference: The replied message has no attachments
      message_not_found: Message not found
    result:
      title: Found it
      metadata: Metadata
      seasons:
        summer: Summer
      notes:
        adult: 18+
      buttons:
        myanimelist: MyAnimeList
      fields:
        title: "Title: {title}"
        genres: "Genres: {genres}"
        notes: "Notes: {notes}"
        other_titles: "Other titles:"
        similarity: "Similarity: {similarity}"
        episode: "Episode: {episode}"
        frame: "Frame: {frame}"
"#;

    struct Channel {
        messages: Vec<Message>,
    }

    #[async_trait]
    impl Bot for Channel {
        async fn send_reply(&self, _channel_id: u64, _reply: &Reply, _reference: Option<u64>) -> Result<u64, BotError> {
            Ok(1)
        }

        async fn fetch_message(&self, channel_id: u64, message_id: u64) -> Result<Message, BotError> {
            self.messages
                .iter()
                .find(|m| m.channel_id == channel_id && m.id == message_id)
                .cloned()
                .ok_or_else(|| BotError::NotFound(message_id.to_string()))
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo::new(99, "befri")
        }
    }

    fn author() -> User {
        User::new(5, "ann")
    }

    fn ctx(invoking: Message) -> CommandContext {
        let mut i18n = LocalizationProvider::new();
        i18n.insert(LocalizationPackage::from_mapping("english.yml", YamlMapping::parse(ENGLISH).unwrap()).unwrap());
        let state = Arc::new(BotState::new(Config::default(), Design::default(), i18n));

        let with_image = Message::new(100, 10, author(), "look")
            .with_attachment(Attachment::new("frame.png", "https://cdn.discordapp.com/frame.png"));
        let without_image = Message::new(101, 10, author(), "nothing here");
        let elsewhere = Message::new(200, 20, author(), "")
            .with_attachment(Attachment::new("other.png", "https://cdn.discordapp.com/other.png"));
        let bot = Channel {
            messages: vec![with_image, without_image, elsewhere],
        };

        CommandContext::new(state, Arc::new(bot), author(), 10)
            .with_message(invoking)
            .with_command(Arc::new(command()))
    }

    fn invoking(text: &str) -> Message {
        Message::new(1, 10, author(), text)
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com/a.png").is_some());
        assert!(parse_url("ftp://example.com/a.png").is_none());
        assert!(parse_url("not a url").is_none());
        assert!(parse_url("12345").is_none());
    }

    #[test]
    fn test_discord_message_links() {
        let url = parse_url("https://discord.com/channels/1/20/200").unwrap();
        assert!(is_discord(&url));
        assert_eq!(message_link(&url), Some((20, 200)));

        let url = parse_url("https://ptb.discord.com/channels/1/20/200").unwrap();
        assert!(is_discord(&url));

        let url = parse_url("https://notdiscord.com/channels/1/20/200").unwrap();
        assert!(!is_discord(&url));

        let url = parse_url("https://discord.com/channels/1/20").unwrap();
        assert_eq!(message_link(&url), None);
    }

    #[test]
    fn test_search_url_is_form_encoded() {
        let url = search_url(crate::infrastructure::config::DEFAULT_SAUCE_ENDPOINT, "https://x.y/a b.png?s=1");
        assert_eq!(
            url,
            "https://api.trace.moe/search?cutBorders&anilistInfo&url=https%3A%2F%2Fx.y%2Fa+b.png%3Fs%3D1"
        );
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(97.75), "00:01:37.75");
        assert_eq!(format_time(3725.5), "01:02:05.50");
        assert_eq!(format_time(0.0), "00:00:00.00");
    }

    #[test]
    fn test_format_time_carries_rounded_seconds() {
        assert_eq!(format_time(119.996), "00:02:00.00");
        assert_eq!(format_time(3599.999), "01:00:00.00");
        assert_eq!(format_time(59.994), "00:00:59.99");
    }

    #[test]
    fn test_titles_and_episode() {
        let response: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
        let (main, others) = titles(&response.result[0].anilist);

        assert_eq!(main, "Nekopara OVA");
        assert_eq!(others, vec!["ネコぱらOVA", "Neko Para OVA"]);

        assert_eq!(episode(&Value::Null), None);
        assert_eq!(episode(&serde_json::json!(3)).as_deref(), Some("3"));
        assert_eq!(episode(&serde_json::json!([1, 2])).as_deref(), Some("1-2"));
    }

    #[test]
    fn test_api_error_response() {
        let response: SearchResponse = serde_json::from_str(r#"{"error": "Invalid image url"}"#).unwrap();
        assert_eq!(response.error, "Invalid image url");
        assert!(response.result.is_empty());
    }

    #[test]
    fn test_render_result() {
        let response: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
        let ctx = ctx(invoking("b!sauce"));
        let reply = render(&ctx, &response.result[0]);
        let text = reply.plain_text();

        assert!(text.starts_with("### Found it\nhttps://api.trace.moe/video/99939/Nekopara.mp4?t=98.335&now=1653892514&size=l"));
        assert!(text.contains("Title: `Nekopara OVA`"));
        assert!(text.contains("Genres: `Comedy`, `Slice of Life`"));
        assert!(text.contains("Notes: `Summer 2017`"));
        assert!(text.contains("Other titles:\n- `ネコぱらOVA`\n- `Neko Para OVA`"));
        assert!(text.contains("Similarity: `94.4%`"));
        assert!(text.contains("Episode: `none`"));
        assert!(text.contains("Frame: `00:01:37.75` - `00:01:38.92`"));

        let buttons = reply.buttons();
        assert_eq!(buttons[0].url.as_deref(), Some("https://myanimelist.net/anime/34658"));
    }

    #[tokio::test]
    async fn test_image_from_link_or_attachment() {
        let ctx = ctx(invoking("b!sauce"));
        assert_eq!(
            find_image(&ctx, Some("https://example.com/frame.jpg")).await,
            Image::Found("https://example.com/frame.jpg".to_string())
        );
        assert_eq!(find_image(&ctx, None).await, Image::Missing("errors.no_image"));

        let with_attachment = invoking("b!sauce").with_attachment(Attachment::new("a.png", "https://cdn/a.png"));
        let ctx = self::ctx(with_attachment);
        assert_eq!(find_image(&ctx, None).await, Image::Found("https://cdn/a.png".to_string()));
    }

    #[tokio::test]
    async fn test_image_from_message_link_or_id() {
        let ctx = ctx(invoking("b!sauce"));

        assert_eq!(
            find_image(&ctx, Some("https://discord.com/channels/1/20/200")).await,
            Image::Found("https://cdn.discordapp.com/other.png".to_string())
        );
        assert_eq!(
            find_image(&ctx, Some("100")).await,
            Image::Found("https://cdn.discordapp.com/frame.png".to_string())
        );
        assert_eq!(find_image(&ctx, Some("101")).await, Image::Missing("errors.no_attachments_by_url"));
        assert_eq!(find_image(&ctx, Some("999")).await, Image::Missing("errors.message_not_found"));
    }

    #[tokio::test]
    async fn test_image_from_replied_message() {
        let ctx = ctx(invoking("b!sauce").with_reference(10, 100));
        assert_eq!(
            find_image(&ctx, None).await,
            Image::Found("https://cdn.discordapp.com/frame.png".to_string())
        );

        let ctx = self::ctx(invoking("b!sauce").with_reference(10, 101));
        assert_eq!(find_image(&ctx, None).await, Image::Missing("errors.no_attachments_by_reference"));
    }

    #[tokio::test]
    async fn test_missing_image_reply() {
        let ctx = ctx(invoking("b!sauce"));
        let reply = Sauce.execute(&ctx).await.unwrap();
        assert_eq!(reply.plain_text(), "No image");
    }
}
