//! texref-complete - Completion candidates for reference commands.

fn main() -> std::process::ExitCode {
    texref::cmd::complete::main()
}
