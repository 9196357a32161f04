//! CLI output formatting.
//!
//! Pure `format_*` functions return lines so tests can assert on them;
//! thin `print_*` wrappers do the actual terminal output.

use crate::pipeline::Plan;
use crate::types::{RasterVariant, StagedFile};
use std::path::Path;

/// Lines for the `check` command: the would-be work list, paths shown
/// relative to the working directory.
pub fn format_plan(plan: &Plan, base: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, input) in plan.inputs.iter().enumerate() {
        let shown = input.path.strip_prefix(base).unwrap_or(&input.path);
        lines.push(format!(
            "  {:>3}  {} [{}]",
            index + 1,
            shown.display(),
            input.kind
        ));
    }
    let mut tail = format!("{} to process", plan.inputs.len());
    if plan.unchanged > 0 {
        tail.push_str(&format!(", {} unchanged", plan.unchanged));
    }
    if plan.ignored > 0 {
        tail.push_str(&format!(", {} ignored", plan.ignored));
    }
    lines.push(tail);
    lines.push(format!("config fingerprint {}", &plan.fingerprint[..12]));
    lines
}

pub fn print_plan(plan: &Plan, base: &Path) {
    for line in format_plan(plan, base) {
        println!("{}", line);
    }
}

/// Lines listing written outputs, paths shown relative to the working
/// directory. Used by debug builds.
pub fn format_outputs(outputs: &[std::path::PathBuf], base: &Path) -> Vec<String> {
    outputs
        .iter()
        .map(|output| {
            let shown = output.strip_prefix(base).unwrap_or(output);
            format!("    wrote {}", shown.display())
        })
        .collect()
}

pub fn print_outputs(outputs: &[std::path::PathBuf], base: &Path) {
    for line in format_outputs(outputs, base) {
        println!("{}", line);
    }
}

/// Debug line for one staged input.
pub fn format_staged(file: &StagedFile) -> String {
    format!("    staged {} [{}]", file.src.display(), file.kind)
}

/// Debug line for one rendered variant.
pub fn format_rendered(variant: &RasterVariant) -> String {
    format!(
        "    rendered {} [{}]",
        variant.dist.display(),
        variant.format
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedInput;
    use crate::types::FileKind;
    use std::path::PathBuf;

    fn sample_plan() -> Plan {
        Plan {
            inputs: vec![
                ResolvedInput {
                    path: PathBuf::from("/work/assets/logo.svg"),
                    kind: FileKind::Svg,
                },
                ResolvedInput {
                    path: PathBuf::from("/work/assets/icons/chat.png"),
                    kind: FileKind::Png,
                },
            ],
            unchanged: 0,
            ignored: 0,
            fingerprint: "abcdef0123456789".repeat(4),
        }
    }

    #[test]
    fn plan_lists_inputs_relative_to_base() {
        let lines = format_plan(&sample_plan(), Path::new("/work"));
        assert_eq!(lines[0], "    1  assets/logo.svg [svg]");
        assert_eq!(lines[1], "    2  assets/icons/chat.png [png]");
        assert_eq!(lines[2], "2 to process");
        assert_eq!(lines[3], "config fingerprint abcdef012345");
    }

    #[test]
    fn plan_tail_includes_skip_counts_when_present() {
        let mut plan = sample_plan();
        plan.unchanged = 3;
        plan.ignored = 1;
        let lines = format_plan(&plan, Path::new("/work"));
        assert_eq!(lines[2], "2 to process, 3 unchanged, 1 ignored");
    }

    #[test]
    fn paths_outside_base_stay_absolute() {
        let mut plan = sample_plan();
        plan.inputs[0].path = PathBuf::from("/elsewhere/logo.svg");
        let lines = format_plan(&plan, Path::new("/work"));
        assert_eq!(lines[0], "    1  /elsewhere/logo.svg [svg]");
    }

    #[test]
    fn outputs_are_listed_relative_to_base() {
        let outputs = vec![PathBuf::from("/work/dist/logo.png")];
        let lines = format_outputs(&outputs, Path::new("/work"));
        assert_eq!(lines, vec!["    wrote dist/logo.png"]);
    }

    #[test]
    fn debug_lines_name_the_artifact_and_kind() {
        let staged = StagedFile {
            src: PathBuf::from("/work/logo.svg"),
            staged: PathBuf::from("/scratch/logo.optimized.svg"),
            dist: PathBuf::from("/work/dist/logo.svg"),
            kind: FileKind::Svg,
        };
        assert_eq!(format_staged(&staged), "    staged /work/logo.svg [svg]");

        let variant = RasterVariant {
            staged: PathBuf::from("/scratch/logo.optimized.png"),
            dist: PathBuf::from("/work/dist/logo.png"),
            format: "png".into(),
        };
        assert_eq!(
            format_rendered(&variant),
            "    rendered /work/dist/logo.png [png]"
        );
    }
}
