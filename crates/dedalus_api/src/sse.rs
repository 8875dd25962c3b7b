/// Incremental parser for blank-line-delimited event streams.
///
/// Providers frame chat-completion streams as blocks of lines separated by a
/// blank line. Payload lines carry a `data:` prefix; `:`-prefixed comment
/// lines are dropped. Some gateways proxy a plain JSON body despite
/// `stream=true`, so a block without any `data:` line still yields its raw
/// text when it looks like a JSON object.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: String,
    pending: Vec<String>,
}

impl EventStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete payloads.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut payloads = Vec::new();

        while let Some(split) = self.buffer.find('\n') {
            let mut line = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 1);
            if line.ends_with('\r') {
                line.pop();
            }

            if line.is_empty() {
                if let Some(payload) = drain_block(&mut self.pending) {
                    payloads.push(payload);
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            self.pending.push(line);
        }

        payloads
    }

    /// Drain the trailing block when the stream ends without a final blank line.
    pub fn finish(&mut self) -> Option<String> {
        let mut line = std::mem::take(&mut self.buffer);
        if line.ends_with('\r') {
            line.pop();
        }
        if !line.is_empty() && !line.starts_with(':') {
            self.pending.push(line);
        }

        drain_block(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty() && self.pending.is_empty()
    }
}

fn drain_block(lines: &mut Vec<String>) -> Option<String> {
    let lines = std::mem::take(lines);
    if lines.is_empty() {
        return None;
    }

    let data_lines: Vec<&str> = lines
        .iter()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect();

    if !data_lines.is_empty() {
        let payload = data_lines.join("\n").trim().to_string();
        return if payload.is_empty() { None } else { Some(payload) };
    }

    let raw = lines.join("\n").trim().to_string();
    if raw.starts_with('{') {
        Some(raw)
    } else {
        None
    }
}
