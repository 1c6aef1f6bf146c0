use std::io::{self, stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand};

use car::CarStatus;

// header rows plus the closing border
const HEADER_SIZE: u16 = 5;

pub struct Debug {
    stdout: Stdout,
    printed_lines: u16,
}

impl Default for Debug {
    fn default() -> Self {
        Debug::new()
    }
}

impl Debug {
    pub fn new() -> Self {
        Debug {
            stdout: stdout(),
            printed_lines: 0,
        }
    }

    /// Redraws the roster table in place.
    pub fn printstatus(&mut self, statuses: &[CarStatus]) -> io::Result<()> {
        if self.printed_lines > 0 {
            self.stdout.execute(cursor::MoveUp(self.printed_lines))?;
            self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        write_table(&mut self.stdout, statuses)?;
        self.printed_lines = HEADER_SIZE + 2 * statuses.len() as u16;
        Ok(())
    }
}

pub fn write_table(out: &mut impl Write, statuses: &[CarStatus]) -> io::Result<()> {
    writeln!(out, "+------------------------------------------------------------------------+")?;
    writeln!(out, "| ELEVATORS                                                              |")?;
    writeln!(out, "+----------+----------+------------+------------+------------+----------+")?;
    writeln!(
        out,
        "| {0:<8} | {1:<8} | {2:<10} | {3:<10} | {4:<10} | {5:<8} |",
        "CAR", "FLOOR", "DIRECTION", "ADDRESSED", "PASSENGERS", "RUNNING"
    )?;
    for status in statuses {
        writeln!(out, "+----------+----------+------------+------------+------------+----------+")?;
        writeln!(
            out,
            "| {0:<8} | {1:<8} | {2:<10} | {3:<10} | {4:<10} | {5:<8} |",
            status.id,
            status.floor,
            status.direction.as_string(),
            status.addressed_floor,
            status.passengers,
            status.running
        )?;
    }
    writeln!(out, "+----------+----------+------------+------------+------------+----------+")?;
    Ok(())
}
