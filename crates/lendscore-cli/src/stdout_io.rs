use std::io::{self, Write};

/// Writes to stdout, treating a closed reader (`| head`) as success.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    tolerate_broken_pipe(stdout.write_all(text.as_bytes()))?;
    tolerate_broken_pipe(stdout.flush())
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    tolerate_broken_pipe(stdout.write_all(text.as_bytes()))?;
    tolerate_broken_pipe(stdout.write_all(b"\n"))?;
    tolerate_broken_pipe(stdout.flush())
}

fn tolerate_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::tolerate_broken_pipe;

    #[test]
    fn broken_pipe_is_not_an_error() {
        let broken = Err(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(tolerate_broken_pipe(broken).is_ok());

        let denied = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(tolerate_broken_pipe(denied).is_err());
    }
}
