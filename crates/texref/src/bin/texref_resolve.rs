//! texref-resolve - Resolve references to their definitions.

fn main() -> std::process::ExitCode {
    texref::cmd::resolve::main()
}
