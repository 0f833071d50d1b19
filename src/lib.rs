pub mod block;
pub mod checker;
pub mod connection;
pub mod constants;
pub mod db;
pub mod definition;
pub mod render;
pub mod svg;
pub mod workspace;

use wasm_bindgen::prelude::*;

use definition::BlockDefinition;
use render::RendererRegistry;
use workspace::Workspace;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a JSON block definition to a standalone SVG document
#[wasm_bindgen(js_name = "blockToSvg")]
pub fn render_block(source: &str, renderer: Option<String>) -> Result<String, String> {
    let def = BlockDefinition::from_json(source).map_err(|e| e.to_string())?;

    let registry = RendererRegistry::with_defaults();
    let name = renderer.as_deref().unwrap_or("classic");
    let renderer = registry
        .create(name)
        .ok_or_else(|| format!("unknown renderer: {}", name))?;

    let mut ws = Workspace::new();
    let block = ws.instantiate(&def).map_err(|e| e.to_string())?;
    let result = renderer.render(&mut ws, block).map_err(|e| e.to_string())?;

    Ok(svg::preview(
        &result.outline,
        &result.inline,
        result.width,
        result.height,
    ))
}
