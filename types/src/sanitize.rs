//! Terminal-safe rendering of fault text.
//!
//! Fault messages come from arbitrary subtree code (panic payloads, error
//! chains that embed user input or backend responses). Before they reach the
//! terminal, escape sequences and control characters are removed so a fault
//! cannot clear the screen, move the cursor, or write to the clipboard.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strips ANSI escape sequences and control characters, keeping `\n` and `\t`.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
#[must_use]
pub fn sanitize_fault_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => match chars.peek() {
                Some('[') => {
                    chars.next();
                    skip_csi(&mut chars);
                }
                Some(']' | 'P' | '^' | '_') => {
                    chars.next();
                    skip_string_sequence(&mut chars);
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            C1_CSI => skip_csi(&mut chars),
            c if is_unsafe(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_unsafe(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        '\u{0000}'..='\u{001f}' | '\u{007f}'..='\u{009f}' => true,
        _ => false,
    }
}

/// Parameter and intermediate bytes, then one final byte.
fn skip_csi<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(&c) = chars.peek() {
        match c {
            '\x20'..='\x3f' => {
                chars.next();
            }
            '\x40'..='\x7e' => {
                chars.next();
                return;
            }
            _ => return,
        }
    }
}

/// OSC/DCS/PM/APC bodies, terminated by BEL or ST (`ESC \`).
fn skip_string_sequence<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
