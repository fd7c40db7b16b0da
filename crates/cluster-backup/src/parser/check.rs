/// `true` if and only if the output of `restic check` has a line reading
/// `no errors were found`.
pub fn parse_check_output(output: &[u8]) -> bool {
    String::from_utf8_lossy(output)
        .lines()
        .any(|line| line.trim() == "no errors were found")
}
