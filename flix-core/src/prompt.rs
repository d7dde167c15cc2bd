use crate::models::FilterSelection;

/// Number of movies the model is asked for
pub const MOVIES_PER_REQUEST: usize = 5;

/// Renders the recommendation prompt for a selection
pub fn build_prompt(selection: &FilterSelection) -> String {
    let genres = selection
        .genres()
        .iter()
        .map(|g| g.id())
        .collect::<Vec<_>>()
        .join(", ");
    let language = selection.language().name();

    format!(
        r#"IMPORTANT: Answer EXACTLY in valid JSON.
Do NOT add comments or any text outside the JSON structure.

Give {MOVIES_PER_REQUEST} high-quality movie recommendations matching these criteria:
- Genre: {genres}
- Language: {language}

The answer MUST be valid JSON with the following structure:
{{
  "movies": [
    {{
      "title": "Movie title",
      "synopsis": "Short, engaging synopsis (max 100 words)",
      "director": "Director name",
      "mainCast": ["Actor 1", "Actor 2", "Actor 3"],
      "rating": 8.5,
      "releaseYear": 2023,
      "additionalDetails": "An interesting extra fact about the movie"
    }}
  ]
}}

Make sure that:
- The movies really match the requested genres
- The movies are high quality and engaging
- The information is accurate and up to date"#
    )
}
