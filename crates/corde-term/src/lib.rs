// SPDX-License-Identifier: MIT
//
// corde-term — terminal layer for corde.
//
// Everything between the editor and the tty: 24-bit colors, the Symbol
// cell type, layered screen buffers composited by blit, whole-frame ANSI
// output in a single write, raw mode with panic-safe restore, stdin polling,
// and a key parser that understands the Kitty keyboard protocol.
//
// Direct ANSI and termios, no TUI framework. Each frame is rendered in full;
// there is no diffing.

pub mod ansi;
pub mod buffer;
pub mod color;
pub mod input;
pub mod output;
pub mod poll;
pub mod symbol;
pub mod terminal;
