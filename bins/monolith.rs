mod runner;

fn main() -> std::process::ExitCode {
    runner::run(server::Role::Monolith)
}
