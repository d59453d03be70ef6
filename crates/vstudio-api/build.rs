fn main() {
    // Embed templates from the "templates" directory relative to CARGO_MANIFEST_DIR
    minijinja_embed::embed_templates!("templates");
}
