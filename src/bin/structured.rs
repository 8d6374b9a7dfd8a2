fn main() -> anyhow::Result<()> {
    realistic_render::structured()
}
