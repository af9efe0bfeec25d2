/// A single creature record as returned by PokeAPI.
///
/// Records are transient views of the remote API response. They are never
/// mutated after construction; every successful lookup replaces the whole value.
///
/// # Related Types
///
/// - [`crate::models::Query`]: The key used to request a record
/// - [`crate::models::ViewState`]: Holds the currently displayed record
/// - [`crate::services::PokeApiClient`]: Builds records from JSON responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
    /// Positive identifier assigned by the remote API
    pub id: u32,

    /// Lowercase API name (e.g., "bulbasaur")
    pub name: String,

    /// Front sprite URL, absent for records without artwork
    pub sprite_url: Option<String>,

    /// Type names in API slot order
    pub types: Vec<String>,
}

impl Pokemon {
    /// Name with the first letter of each whitespace-separated word uppercased
    pub fn display_name(&self) -> String {
        self.name
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Type names joined with ", "
    pub fn types_label(&self) -> String {
        self.types.join(", ")
    }

    /// Whether stepping backward can reach a lower identifier
    pub fn has_previous(&self) -> bool {
        self.id > 1
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
