use crate::display::{InputEvent, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// The system asked the application to quit.
    Quit,
    /// Leave the overlay and resume the game.
    Close,
    Back,
    Up,
    Down,
    Left,
    Right,
    Accept,
}

/// Maps a host event to a menu command. Letter keys mirror the console's
/// button mapping (A/B, U/D/L/R).
pub fn decode(event: &InputEvent) -> Option<MenuCommand> {
    let key = match event {
        InputEvent::Quit => return Some(MenuCommand::Quit),
        InputEvent::KeyDown(key) => key,
    };

    match key {
        Key::Escape | Key::Char('q') => Some(MenuCommand::Close),
        Key::Char('b') => Some(MenuCommand::Back),
        Key::Up | Key::Char('u') => Some(MenuCommand::Up),
        Key::Down | Key::Char('d') => Some(MenuCommand::Down),
        Key::Left | Key::Char('l') => Some(MenuCommand::Left),
        Key::Right | Key::Char('r') => Some(MenuCommand::Right),
        Key::Return | Key::Char('a') => Some(MenuCommand::Accept),
        Key::Char(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_arrows_agree() {
        let pairs = [
            (Key::Up, Key::Char('u')),
            (Key::Down, Key::Char('d')),
            (Key::Left, Key::Char('l')),
            (Key::Right, Key::Char('r')),
            (Key::Return, Key::Char('a')),
            (Key::Escape, Key::Char('q')),
        ];
        for (arrow, letter) in pairs {
            assert_eq!(
                decode(&InputEvent::KeyDown(arrow)),
                decode(&InputEvent::KeyDown(letter))
            );
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(decode(&InputEvent::KeyDown(Key::Char('x'))), None);
        assert_eq!(decode(&InputEvent::Quit), Some(MenuCommand::Quit));
    }
}
