// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};
use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::frame::Frame;

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(None); len],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    force_full: bool,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            force_full: false,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Repaint everything on the next draw. Used after a resize event to
    /// re-synchronize the surface without touching simulation bounds.
    pub fn request_full_redraw(&mut self) {
        self.force_full = true;
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let needs_full = self.force_full
            || self
                .last
                .as_ref()
                .map(|l| l.width != frame.width || l.height != frame.height)
                .unwrap_or(true);

        if needs_full {
            self.last = Some(LastFrame::new(frame.width, frame.height));
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }
        self.force_full = false;

        let last = self.last.as_mut().expect("set above");

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut wrote = false;

        for y in 0..frame.height {
            let mut skip_cols: u16 = 0;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                if skip_cols > 0 {
                    // shadow column of a wide glyph: sync the cache but
                    // print nothing over the glyph's right half
                    skip_cols -= 1;
                    last.cells[idx] = cell;
                    continue;
                }
                if !needs_full && last.cells[idx] == cell {
                    continue;
                }
                last.cells[idx] = cell;

                self.stdout.queue(cursor::MoveTo(x, y))?;

                if cell.fg != cur_fg || !wrote {
                    self.stdout
                        .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    cur_fg = cell.fg;
                }
                if cell.bg != cur_bg || !wrote {
                    self.stdout
                        .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    cur_bg = cell.bg;
                }
                wrote = true;

                self.stdout.queue(Print(cell.ch))?;
                if let Some(comb) = cell.comb {
                    self.stdout.queue(Print(comb))?;
                }

                // Leave the shadow column of a wide glyph alone so the
                // next cells do not clobber its right half.
                let w = UnicodeWidthChar::width(cell.ch).unwrap_or(1) as u16;
                skip_cols = w.saturating_sub(1);
            }
        }

        if wrote || needs_full {
            self.stdout.queue(SetAttribute(Attribute::Reset))?;
            self.stdout.queue(ResetColor)?;
            self.stdout.flush()?;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
