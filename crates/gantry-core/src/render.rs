//! Render traits — every entity shown to a consumer has two independent
//! representations: a fixed human-readable layout for the CLI and a
//! lossless JSON encoding for the wire.

use std::io::Write;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering an entity.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Human-readable rendering, written to an output sink.
pub trait CliRender {
    fn render_cli(&self, out: &mut dyn Write) -> RenderResult<()>;
}

/// Machine-readable rendering — field-complete JSON bytes.
pub trait WireRender {
    fn render_wire(&self) -> RenderResult<Vec<u8>>;
}

// Anything serde can serialize gets the wire rendering for free; the CLI
// layout stays a per-entity decision.
impl<T: serde::Serialize> WireRender for T {
    fn render_wire(&self) -> RenderResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn wire_render_is_json() {
        let sample = Sample {
            name: "api".to_string(),
            count: 3,
        };
        let bytes = sample.render_wire().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["name"], "api");
        assert_eq!(value["count"], 3);
    }
}
