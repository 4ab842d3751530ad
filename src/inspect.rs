use crate::cli::Args;
use crate::format::hunk::parse_hunk_file;
use crate::report;

pub fn run(args: Args) -> anyhow::Result<()> {
    if args.inputs.is_empty() {
        anyhow::bail!("no input files")
    }

    for input in &args.inputs {
        let bytes = std::fs::read(input)
            .map_err(|err| anyhow::anyhow!("cannot read {input}: {err}"))?;
        let file = parse_hunk_file(bytes).map_err(|err| anyhow::anyhow!("{input}: {err}"))?;

        for diagnostic in &file.diagnostics {
            eprintln!("{input}: warning: {diagnostic}");
        }

        if args.quiet {
            continue;
        }
        if args.inputs.len() > 1 {
            println!("{input}:");
        }
        report::print_summary(&file);
        if args.verbose {
            report::print_details(&file);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::cli::Args;
    use crate::format::hunk::{HUNK_BSS, HUNK_END, HUNK_HEADER};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn args(inputs: Vec<String>) -> Args {
        Args {
            verbose: false,
            quiet: true,
            inputs,
        }
    }

    #[test]
    fn inspects_a_minimal_executable() {
        let uniq = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("rahp-inspect-test-{uniq}"));
        fs::create_dir_all(&dir).expect("mkdir");

        let mut image = Vec::new();
        for word in [HUNK_HEADER, 0, 1, 0, 0, 1, HUNK_BSS, 1, HUNK_END] {
            image.extend_from_slice(&word.to_be_bytes());
        }
        let path = dir.join("minimal.exe");
        fs::write(&path, image).expect("write image");

        run(args(vec![path.to_string_lossy().to_string()])).expect("inspect should succeed");

        let _ = fs::remove_file(path);
        let _ = fs::remove_dir(dir);
    }

    #[test]
    fn reports_missing_input() {
        let err = run(args(vec!["does-not-exist.exe".to_string()])).expect_err("must fail");
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn reports_empty_input_list() {
        let err = run(args(Vec::new())).expect_err("must fail");
        assert!(err.to_string().contains("no input files"));
    }
}
