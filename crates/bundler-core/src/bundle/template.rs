//! Bootstrap shell script placed in front of the payload.

/// Marker line separating the bootstrap script from the payload.
///
/// The payload starts on the line after the first line beginning with this
/// marker.
pub const SENTINEL: &str = "__BUNDLER_ARCHIVE__";

const PROLOGUE: &str = r#"#!/bin/bash
set -eu
ARCHIVE=$(awk '/^__BUNDLER_ARCHIVE__/ {print NR + 1; exit 0; }' $0)
if [ $# -gt 0 ]; then
    case "$1" in
        -u|--unpack)
            tail -n+$ARCHIVE $0 | tar -xz
            exit 0
            ;;
        -h|--help)
            echo "usage: $(basename $0) [-u|--unpack] [-h|--help] [ARGS...]"
            echo "  -u, --unpack  extract the bundled files into the current directory"
            echo "  -h, --help    show this help"
            echo "  ARGS          passed on to the bundled command"
            exit 0
            ;;
    esac
fi
export TMPDIR=$(mktemp -d /tmp/bundler.XXXXXX)
tail -n+$ARCHIVE $0 | tar -xz -C $TMPDIR
pushd $TMPDIR > /dev/null
"#;

const EPILOGUE: &str = "popd > /dev/null\nrm -rf $TMPDIR\nexit 0\n\n";

/// Renders the bootstrap script for `command`, ending with the sentinel line.
///
/// The command runs from the extraction directory with all script arguments
/// appended. A blank command leaves the invocation line out; the script still
/// extracts and cleans up.
///
/// # Examples
///
/// ```
/// use bundler_core::SENTINEL;
/// use bundler_core::render_bootstrap;
///
/// let script = render_bootstrap("./run.sh");
/// assert!(script.starts_with("#!/bin/bash\n"));
/// assert!(script.contains("\n./run.sh $*\n"));
/// assert!(script.ends_with(&format!("\n{SENTINEL}\n")));
/// ```
#[must_use]
pub fn render_bootstrap(command: &str) -> String {
    let command = command.trim();
    let mut script = String::with_capacity(PROLOGUE.len() + EPILOGUE.len() + command.len() + 32);
    script.push_str(PROLOGUE);
    if !command.is_empty() {
        script.push_str(command);
        script.push_str(" $*\n");
    }
    script.push_str(EPILOGUE);
    script.push_str(SENTINEL);
    script.push('\n');
    script
}
