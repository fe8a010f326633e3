// Portfolio generation: render a stored portfolio with its template and publish it.
// Rendering is pure (render, inline, seo, minify); only publish and og_image touch disk.

pub mod generator;
pub mod handlers;
pub mod inline;
pub mod minify;
pub mod og_image;
pub mod publish;
pub mod render;
pub mod seo;
