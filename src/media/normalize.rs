use serde_json::Value;
use tracing::{debug, warn};

use crate::util::stable_token;

use super::model::{Node, NodeKind, ShelfStatus, relation};
use super::raw::RawNode;

/// Main-cast policy: only the first entries of a cast list become creators.
pub const MAIN_CAST_LIMIT: usize = 5;
const SLUG_MAX_LEN: usize = 20;

pub const UNNAMED: &str = "Unnamed";
pub const UNNAMED_MOVIE: &str = "Unnamed Movie";
pub const UNKNOWN_CATEGORY: &str = "unknown";

struct CreatorRole {
    role: &'static str,
    fields: &'static [&'static str],
    relation: &'static str,
    placeholder: &'static str,
    limit: Option<usize>,
}

const CREATOR_ROLES: [CreatorRole; 6] = [
    CreatorRole {
        role: "director",
        fields: &["directors", "director"],
        relation: relation::DIRECTED,
        placeholder: "Unknown Director",
        limit: None,
    },
    CreatorRole {
        role: "actor",
        fields: &["cast", "actors", "actor"],
        relation: relation::ACTED_IN,
        placeholder: "Unknown Actor",
        limit: Some(MAIN_CAST_LIMIT),
    },
    CreatorRole {
        role: "author",
        fields: &["authors", "author"],
        relation: relation::WROTE,
        placeholder: "Unknown Author",
        limit: None,
    },
    CreatorRole {
        role: "translator",
        fields: &["translators", "translator"],
        relation: relation::TRANSLATED,
        placeholder: "Unknown Translator",
        limit: None,
    },
    CreatorRole {
        role: "artist",
        fields: &["artists", "artist"],
        relation: relation::PERFORMED,
        placeholder: "Unknown Artist",
        limit: None,
    },
    CreatorRole {
        role: "playwright",
        fields: &["playwrights", "playwright"],
        relation: relation::WROTE,
        placeholder: "Unknown Playwright",
        limit: None,
    },
];

const API_URL_CATEGORIES: [(&str, &str); 7] = [
    ("/book/", "book"),
    ("/movie/", "movie"),
    ("/tv/", "tv"),
    ("/music/", "music"),
    ("/album/", "music"),
    ("/podcast/", "podcast"),
    ("/game/", "game"),
];

const MEDIA_TYPES: [&str; 10] = [
    "media", "book", "edition", "movie", "tv", "tvseries", "music", "album", "podcast", "game",
];

/// A person extracted from a media record, plus the edge tying it to that record.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatorRef {
    pub node: Node,
    pub media_id: String,
    pub relation: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRecord {
    pub node: Node,
    pub creators: Vec<CreatorRef>,
    /// Shelf named on the record itself, used when no shelf edge matches.
    pub shelf_hint: Option<ShelfStatus>,
}

/// Lower-cases `name`, collapses every run of characters outside `[a-z0-9]`
/// into one `_`, trims `_` from both ends and keeps at most 20 characters.
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }

    slug.truncate(SLUG_MAX_LEN);
    let kept = slug.trim_end_matches('_').len();
    slug.truncate(kept);
    slug
}

fn kind_for(type_label: Option<&str>, id: Option<&str>) -> NodeKind {
    if id.is_some_and(|id| ShelfStatus::from_sentinel(id).is_some()) {
        return NodeKind::Shelf;
    }

    let Some(type_label) = type_label else {
        return NodeKind::Media;
    };

    if MEDIA_TYPES.contains(&type_label) {
        return NodeKind::Media;
    }

    match type_label {
        "creator" | "person" => NodeKind::Creator,
        "category" | "organizational" => NodeKind::Organizational,
        "shelf" => NodeKind::Shelf,
        "tag" | "genre" => NodeKind::Tag,
        role if CREATOR_ROLES.iter().any(|known| known.role == role) => NodeKind::Creator,
        _ => NodeKind::Media,
    }
}

/// Category resolution: explicit `category`, `group`, `role`, then `type`,
/// then a path match on `api_url`, else `"unknown"`.
pub fn infer_category(raw: &RawNode) -> String {
    if let Some(explicit) = raw.resolve_str(&["category", "group", "role", "type"]) {
        return explicit.to_lowercase();
    }

    if let Some(api_url) = raw.resolve_str(&["api_url"]) {
        let api_url = api_url.to_ascii_lowercase();
        if let Some((_, category)) = API_URL_CATEGORIES
            .iter()
            .find(|(fragment, _)| api_url.contains(fragment))
        {
            return (*category).to_owned();
        }
    }

    UNKNOWN_CATEGORY.to_owned()
}

fn parse_rating(value: &Value) -> Option<f32> {
    let rating = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    rating.is_finite().then(|| rating.clamp(0.0, 10.0) as f32)
}

/// Entries of a creator field; `None` marks an entry without a usable name.
fn creator_names(value: &Value) -> Vec<Option<String>> {
    fn entry_name(entry: &Value) -> Option<String> {
        let name = match entry {
            Value::String(name) => name.as_str(),
            Value::Object(map) => map.get("name").and_then(Value::as_str)?,
            _ => return None,
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_owned())
    }

    match value {
        Value::Array(entries) => entries.iter().map(entry_name).collect(),
        Value::Null => Vec::new(),
        single => vec![entry_name(single)],
    }
}

fn creator_id(role: &str, name: Option<&str>, media_id: &str, position: usize) -> String {
    match name {
        Some(name) => {
            let slug = slug(name);
            if slug.is_empty() {
                format!("{role}_{}", stable_token(&[name]))
            } else {
                format!("{role}_{slug}")
            }
        }
        None => {
            let position = position.to_string();
            format!("{role}_anon_{}", stable_token(&[media_id, role, position.as_str()]))
        }
    }
}

fn extract_creators(raw: &RawNode, media_id: &str) -> Vec<CreatorRef> {
    let mut creators = Vec::new();

    for role in &CREATOR_ROLES {
        let Some(value) = raw.resolve(role.fields) else {
            continue;
        };

        let mut names = creator_names(value);
        if let Some(limit) = role.limit {
            names.truncate(limit);
        }

        for (position, name) in names.into_iter().enumerate() {
            if name.is_none() {
                warn!(
                    media_id,
                    role = role.role,
                    position,
                    "creator entry has no name, using a stable fallback id"
                );
            }

            let id = creator_id(role.role, name.as_deref(), media_id, position);
            let name = name.unwrap_or_else(|| role.placeholder.to_owned());
            creators.push(CreatorRef {
                node: Node::new(id, name, NodeKind::Creator).with_category(role.role),
                media_id: media_id.to_owned(),
                relation: role.relation,
            });
        }
    }

    creators
}

/// Converts one raw record into a canonical node plus the creators embedded
/// in it. Never fails: missing pieces are replaced with placeholders.
pub fn normalize(raw: &RawNode) -> NormalizedRecord {
    let type_label = raw.resolve_str(&["type"]).map(str::to_lowercase);
    let own_id = raw.id();
    let kind = kind_for(type_label.as_deref(), own_id.as_deref());

    let category = infer_category(raw);

    let name = match raw.resolve_str(&["name", "title"]) {
        Some(name) => name.to_owned(),
        None if kind == NodeKind::Media && category == "movie" => UNNAMED_MOVIE.to_owned(),
        None => UNNAMED.to_owned(),
    };

    let id = own_id.unwrap_or_else(|| {
        let derived = match slug(&name) {
            slug if slug.is_empty() || name == UNNAMED || name == UNNAMED_MOVIE => {
                stable_token(&[category.as_str(), raw.fingerprint().as_str()])
            }
            slug => slug,
        };
        let id = format!("{category}_{derived}");
        debug!(id = id.as_str(), "record has no id, derived one");
        id
    });

    let mut node = Node::new(id, name, kind).with_category(category);
    node.rating = raw.resolve(&["rating"]).and_then(parse_rating);
    node.url = raw.resolve_str(&["url"]).map(str::to_owned);

    let creators = if kind == NodeKind::Media {
        extract_creators(raw, &node.id)
    } else {
        Vec::new()
    };

    NormalizedRecord {
        shelf_hint: raw
            .resolve_str(&["shelf", "shelf_type"])
            .and_then(ShelfStatus::parse),
        node,
        creators,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> RawNode {
        RawNode::from_value(value).expect("object")
    }

    #[test]
    fn slug_collapses_separators_and_truncates() {
        assert_eq!(slug("Al Pacino"), "al_pacino");
        assert_eq!(slug("  --Wong Kar-wai!! "), "wong_kar_wai");
        assert_eq!(slug("Guillermo del Toro Gómez"), "guillermo_del_toro_g");
        assert_eq!(slug("千と千尋"), "");
        assert_eq!(slug("R2-D2"), "r2_d2");
        assert_eq!(slug("Abcdefghijklmnopqrs Tuv"), "abcdefghijklmnopqrs");
    }

    #[test]
    fn category_falls_back_to_api_url() {
        let book = record(json!({ "id": "b1", "data": { "api_url": "/api/book/123" } }));
        assert_eq!(infer_category(&book), "book");

        let album = record(json!({ "id": "a1", "api_url": "https://x/album/9" }));
        assert_eq!(infer_category(&album), "music");

        let bare = record(json!({ "id": "z" }));
        assert_eq!(infer_category(&bare), UNKNOWN_CATEGORY);

        let explicit = record(json!({ "id": "c", "group": "TVSeries", "api_url": "/movie/1" }));
        assert_eq!(infer_category(&explicit), "tvseries");
    }

    #[test]
    fn media_record_yields_node_and_creators() {
        let normalized = normalize(&record(json!({
            "id": "m1",
            "name": "Heat",
            "type": "media",
            "category": "movie",
            "data": {
                "rating": "8.5",
                "url": "https://example.org/heat",
                "directors": "Michael Mann",
                "credits": { "cast": [{ "name": "Al Pacino" }, "Robert De Niro"] }
            }
        })));

        let node = &normalized.node;
        assert_eq!(node.id, "m1");
        assert_eq!(node.kind, NodeKind::Media);
        assert_eq!(node.category.as_deref(), Some("movie"));
        assert_eq!(node.rating, Some(8.5));
        assert_eq!(node.url.as_deref(), Some("https://example.org/heat"));

        let ids = normalized
            .creators
            .iter()
            .map(|creator| (creator.node.id.as_str(), creator.relation))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ("director_michael_mann", relation::DIRECTED),
                ("actor_al_pacino", relation::ACTED_IN),
                ("actor_robert_de_niro", relation::ACTED_IN),
            ]
        );
        assert!(normalized.creators.iter().all(|creator| creator.media_id == "m1"));
    }

    #[test]
    fn cast_is_capped_at_main_cast_in_order() {
        let cast = (1..=8).map(|n| format!("Actor {n}")).collect::<Vec<_>>();
        let normalized = normalize(&record(json!({
            "id": "m1", "type": "movie", "name": "Ensemble", "data": { "cast": cast }
        })));

        let actors = normalized
            .creators
            .iter()
            .filter(|creator| creator.relation == relation::ACTED_IN)
            .map(|creator| creator.node.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            actors,
            vec!["actor_actor_1", "actor_actor_2", "actor_actor_3", "actor_actor_4", "actor_actor_5"]
        );
    }

    #[test]
    fn missing_pieces_get_placeholders() {
        let movie = normalize(&record(json!({ "id": "m9", "type": "movie" })));
        assert_eq!(movie.node.name, UNNAMED_MOVIE);
        assert_eq!(movie.node.category.as_deref(), Some("movie"));

        let other = normalize(&record(json!({ "id": "t1", "type": "tag" })));
        assert_eq!(other.node.name, UNNAMED);
        assert_eq!(other.node.kind, NodeKind::Tag);
        assert!(other.creators.is_empty());

        let bad_rating = normalize(&record(json!({ "id": "m2", "rating": "great" })));
        assert_eq!(bad_rating.node.rating, None);

        let clamped = normalize(&record(json!({ "id": "m3", "rating": 14 })));
        assert_eq!(clamped.node.rating, Some(10.0));
    }

    #[test]
    fn unnamed_creators_get_reproducible_ids() {
        let raw = record(json!({
            "id": "m1", "type": "movie", "name": "Heat",
            "data": { "directors": [{ "role": "x" }, "李安"] }
        }));

        let first = normalize(&raw);
        let second = normalize(&raw);
        assert_eq!(first, second);

        let anonymous = &first.creators[0].node;
        assert!(anonymous.id.starts_with("director_anon_"));
        assert_eq!(anonymous.name, "Unknown Director");

        let non_latin = &first.creators[1].node;
        assert_eq!(non_latin.name, "李安");
        assert_eq!(non_latin.id.len(), "director_".len() + 8);
    }

    #[test]
    fn missing_ids_are_derived_from_name() {
        let normalized = normalize(&record(json!({ "name": "The Wire", "type": "tv" })));
        assert_eq!(normalized.node.id, "tv_the_wire");

        let nameless = record(json!({ "type": "book", "data": { "isbn": "123" } }));
        assert_eq!(normalize(&nameless).node.id, normalize(&nameless).node.id);
    }

    #[test]
    fn shelf_sentinels_and_hints() {
        let shelf = normalize(&record(json!({ "id": "shelf_complete", "name": "Complete" })));
        assert_eq!(shelf.node.kind, NodeKind::Shelf);

        let hinted = normalize(&record(json!({ "id": "m1", "type": "movie", "shelf": "wishlist" })));
        assert_eq!(hinted.shelf_hint, Some(ShelfStatus::Wishlist));
    }
}
