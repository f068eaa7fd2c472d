use shadow_rs::ShadowBuilder;

fn main() {
    // Version metadata for `--version` and the default application version
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
