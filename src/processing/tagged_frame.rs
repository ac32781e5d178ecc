/*! Tagged frames

A tagged frame is a tab-separated table of tokens, with a single header line:

```text
token	lemma	pos	xpos
Herr	herr	NN	NN|UTR|SIN|IND|NOM
```

Every frame is expected to begin with its header line.
!*/

/// Header used by the upstream tagger.
pub const HEADER: &str = "token\tlemma\tpos\txpos";

fn non_empty_lines(frame: &str) -> impl Iterator<Item = &str> {
    frame.lines().filter(|line| !line.trim().is_empty())
}

/// Number of data rows (that is, tokens) of a frame.
pub fn count_rows(frame: &str) -> usize {
    non_empty_lines(frame).count().saturating_sub(1)
}

/// Splits a frame into its header line and its data rows.
pub fn split_header(frame: &str) -> (Option<&str>, impl Iterator<Item = &str>) {
    let mut lines = non_empty_lines(frame);
    let header = lines.next();
    (header, lines)
}

/// Merge frames into a single one, keeping the first header only.
///
/// Subsequent headers are dropped when they are equal to the retained one,
/// and frames are newline-separated. Empty frames and blank lines are skipped.
pub fn merge<'a, I>(frames: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut header: Option<&str> = None;
    let mut lines: Vec<&str> = Vec::new();

    for frame in frames {
        let mut frame_lines = non_empty_lines(frame);
        match (header, frame_lines.next()) {
            (_, None) => continue,
            (None, Some(first)) => {
                header = Some(first);
                lines.push(first);
            }
            (Some(h), Some(first)) if first == h => (),
            (Some(_), Some(first)) => lines.push(first),
        }
        lines.extend(frame_lines);
    }

    lines.join("\n")
}
