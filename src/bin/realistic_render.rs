fn main() -> anyhow::Result<()> {
    realistic_render::realistic_render()
}
