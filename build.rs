use std::process::Command;

/// 执行命令并取首行输出，失败时返回 "unknown"
fn capture(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let commit = capture("git", &["rev-parse", "--short", "HEAD"]);
    let build_date = capture("date", &["-u", "+%Y-%m-%d"]);
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=POSTSHELF_GIT_COMMIT={commit}");
    println!("cargo:rustc-env=POSTSHELF_BUILD_DATE={build_date}");
    println!("cargo:rustc-env=POSTSHELF_BUILD_TARGET={target}");

    println!("cargo:rerun-if-changed=.git/HEAD");
}
