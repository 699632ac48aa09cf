//! texref-labels - List label definitions in a LaTeX project.

fn main() -> std::process::ExitCode {
    texref::cmd::labels::main()
}
