fn main() {
    // Generates the build metadata consumed by metadata.rs
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("shadow-rs failed to generate build metadata");
}
