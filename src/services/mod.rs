//! Services module - record lookup logic, independent of the UI layer.
//!
//! # Components
//!
//! - [`LookupController`]: The fetch / search / navigate cycle. Tags every
//!   request with a sequence number and applies only the newest response.
//! - [`PokemonSource`]: Trait seam for anything that can produce records.
//! - [`PokeApiClient`]: `reqwest`-based [`PokemonSource`] for the PokeAPI
//!   `pokemon` endpoint. Non-success statuses become [`LookupError::NotFound`].
//! - [`SpriteLoader`]: Downloads and decodes a record's sprite image.
//!
//! None of these depend on Slint; the GUI drives them through the tokio runtime.

pub mod lookup;
pub mod pokeapi;
pub mod sprites;

pub use lookup::{FetchOutcome, LookupController};
pub use pokeapi::{LookupError, NOT_FOUND_MESSAGE, PokeApiClient, PokemonSource, parse_pokemon};
pub use sprites::{SpriteData, SpriteError, SpriteLoader, decode_sprite};
