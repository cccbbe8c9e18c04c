//! Turn-level game state that lives beside the board.
//!
//! Side to move, king squares, check flags, the one-ply en-passant window and
//! per-colour castling rights. Only a committed move changes any of it.

use crate::engine::types::{CastleSide, ChessError, Color, Square};

// ---------------------------------------------------------------------------
// EnPassant
// ---------------------------------------------------------------------------

/// Left behind by a pawn double-step; valid for exactly one reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnPassant {
    /// Where the double-stepped pawn now stands.
    pub pawn_square: Square,
    /// The squares beside it from which an enemy pawn may capture
    /// (`None` where the flank falls off the board).
    pub eligible: [Option<Square>; 2],
}

impl EnPassant {
    /// Window opened by a pawn that just landed on `pawn_square`.
    pub fn after_double_step(pawn_square: Square) -> Self {
        let rank = pawn_square.rank() as i8;
        let file = pawn_square.file() as i8;
        EnPassant {
            pawn_square,
            eligible: [Square::at(rank, file - 1), Square::at(rank, file + 1)],
        }
    }

    /// Can a pawn standing on `sq` capture through this window?
    #[inline]
    pub fn is_eligible(&self, sq: Square) -> bool {
        self.eligible.contains(&Some(sq))
    }

    /// The square the capturing pawn lands on, given the moved pawn's colour.
    pub fn target(&self, moved: Color) -> Option<Square> {
        Square::at(
            self.pawn_square.rank() as i8 - moved.forward(),
            self.pawn_square.file() as i8,
        )
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Which castling participants of one colour have moved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub king_moved: bool,
    pub short_rook_moved: bool,
    pub long_rook_moved: bool,
}

impl CastlingRights {
    /// Rights lost entirely.
    pub const NONE: CastlingRights = CastlingRights {
        king_moved: true,
        short_rook_moved: true,
        long_rook_moved: true,
    };

    #[inline]
    pub fn can_castle(self, side: CastleSide) -> bool {
        !self.king_moved && !self.rook_moved(side)
    }

    #[inline]
    pub fn rook_moved(self, side: CastleSide) -> bool {
        match side {
            CastleSide::Short => self.short_rook_moved,
            CastleSide::Long => self.long_rook_moved,
        }
    }

    #[inline]
    pub fn mark_rook_moved(&mut self, side: CastleSide) {
        match side {
            CastleSide::Short => self.short_rook_moved = true,
            CastleSide::Long => self.long_rook_moved = true,
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub side_to_move: Color,
    /// Indexed by `Color::index()`.
    pub king_squares: [Square; 2],
    pub in_check: [bool; 2],
    pub en_passant: Option<EnPassant>,
    pub castling: [CastlingRights; 2],
}

impl GameState {
    /// State of the standard starting position.
    pub fn initial() -> Self {
        GameState {
            side_to_move: Color::White,
            king_squares: [Square::from_file_rank(4, 0), Square::from_file_rank(4, 7)],
            in_check: [false; 2],
            en_passant: None,
            castling: [CastlingRights::default(); 2],
        }
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    #[inline]
    pub fn castling_rights(&self, color: Color) -> CastlingRights {
        self.castling[color.index()]
    }

    /// Parse a FEN castling field (e.g. "KQkq", "-", "Kq").
    pub fn castling_from_fen(field: &str) -> Result<[CastlingRights; 2], ChessError> {
        let invalid = || ChessError::InvalidFen(format!("invalid castling string: '{field}'"));
        if field == "-" {
            return Ok([CastlingRights::NONE; 2]);
        }
        if field.is_empty() {
            return Err(invalid());
        }
        let mut rights = [CastlingRights::NONE; 2];
        for c in field.chars() {
            let (color, side) = match c {
                'K' => (Color::White, CastleSide::Short),
                'Q' => (Color::White, CastleSide::Long),
                'k' => (Color::Black, CastleSide::Short),
                'q' => (Color::Black, CastleSide::Long),
                _ => return Err(invalid()),
            };
            let r = &mut rights[color.index()];
            r.king_moved = false;
            match side {
                CastleSide::Short => r.short_rook_moved = false,
                CastleSide::Long => r.long_rook_moved = false,
            }
        }
        Ok(rights)
    }

    /// Convert castling rights to a FEN field.
    pub fn castling_fen(&self) -> String {
        let mut s = String::with_capacity(4);
        for color in Color::BOTH {
            let rights = self.castling_rights(color);
            for (side, letter) in [(CastleSide::Short, 'K'), (CastleSide::Long, 'Q')] {
                if rights.can_castle(side) {
                    s.push(match color {
                        Color::White => letter,
                        Color::Black => letter.to_ascii_lowercase(),
                    });
                }
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
