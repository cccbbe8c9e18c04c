//! Mailbox board: the single source of truth for square occupancy.
//!
//! `Board` stores one optional piece per square (LERF order: a1 = 0, h8 = 63)
//! and hands out piece identities. It also owns the line-of-sight checks
//! and the scoped `Simulation` used for king-safety tests.

use std::ops::Deref;

use crate::engine::types::{ChessError, Color, Piece, PieceId, PieceType, Square};

/// Back-rank order from the a-file to the h-file.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// An 8×8 grid holding at most one piece per square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; Square::NUM],
    /// Identity handed to the next piece created on this board.
    next_id: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [None; Square::NUM],
            next_id: 0,
        }
    }

    /// Standard starting position.
    pub fn initial() -> Self {
        let mut board = Board::empty();
        for color in Color::BOTH {
            for (file, &kind) in BACK_RANK.iter().enumerate() {
                board.spawn(
                    Square::from_file_rank(file as u8, color.back_rank()),
                    color,
                    kind,
                );
            }
            for file in 0..8 {
                board.spawn(
                    Square::from_file_rank(file, color.pawn_rank()),
                    color,
                    PieceType::Pawn,
                );
            }
        }
        board
    }

    // -----------------------------------------------------------------------
    // Piece manipulation
    // -----------------------------------------------------------------------

    /// Create a new piece with a fresh identity and place it on `sq`.
    ///
    /// Panics if `sq` is occupied: two pieces never share a square.
    pub fn spawn(&mut self, sq: Square, color: Color, kind: PieceType) -> Piece {
        let piece = Piece {
            id: PieceId(self.next_id),
            kind,
            color,
        };
        self.next_id += 1;
        let previous = self.squares[sq.index()].replace(piece);
        assert!(
            previous.is_none(),
            "spawned {piece} on occupied square {sq} (board:\n{})",
            self.board_string()
        );
        piece
    }

    /// Lift the piece off `sq`, if any.
    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    /// Move whatever stands on `from` to `to`, returning what `to` held before.
    ///
    /// Panics if `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.squares[from.index()].take().unwrap_or_else(|| {
            panic!(
                "no piece to relocate from {from} (board:\n{})",
                self.board_string()
            )
        });
        self.squares[to.index()].replace(piece)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square? Off-board squares are empty.
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares.get(sq.index()).copied().flatten()
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.get(sq).is_some()
    }

    /// Every occupied square with its piece, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|piece| (Square(i as u8), piece)))
    }

    /// Where is this colour's king?
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is(color, PieceType::King))
            .map(|(sq, _)| sq)
    }

    // -----------------------------------------------------------------------
    // Line of sight
    // -----------------------------------------------------------------------

    /// Squares strictly between `from` and `to` along a rank are empty.
    /// Moves that do not run along a rank pass trivially.
    pub fn is_rank_clear(&self, from: Square, to: Square) -> bool {
        if from.rank() != to.rank() || from.file() == to.file() {
            return true;
        }
        self.is_line_clear(from, to)
    }

    /// Squares strictly between `from` and `to` along a file are empty.
    /// Moves that do not run along a file pass trivially.
    pub fn is_file_clear(&self, from: Square, to: Square) -> bool {
        if from.file() != to.file() || from.rank() == to.rank() {
            return true;
        }
        self.is_line_clear(from, to)
    }

    /// Squares strictly between `from` and `to` along a diagonal are empty.
    /// Moves that are not diagonal pass trivially.
    pub fn is_diagonal_clear(&self, from: Square, to: Square) -> bool {
        let dr = to.rank() as i8 - from.rank() as i8;
        let df = to.file() as i8 - from.file() as i8;
        if dr == 0 || dr.abs() != df.abs() {
            return true;
        }
        self.is_line_clear(from, to)
    }

    /// Walk the straight line from `from` to `to`, ends excluded.
    fn is_line_clear(&self, from: Square, to: Square) -> bool {
        let dr = (to.rank() as i8 - from.rank() as i8).signum();
        let df = (to.file() as i8 - from.file() as i8).signum();
        let mut rank = from.rank() as i8 + dr;
        let mut file = from.file() as i8 + df;
        while let Some(sq) = Square::at(rank, file) {
            if sq == to {
                return true;
            }
            if self.is_occupied(sq) {
                return false;
            }
            rank += dr;
            file += df;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Tentatively move the piece on `from` to `to`, optionally lifting the
    /// piece on `lifted` as well (an en-passant victim).
    ///
    /// The returned guard reads as the simulated board and puts every touched
    /// square back when dropped, including during a panic unwind. Returns
    /// `None` (and changes nothing) when `from` is empty.
    pub fn simulate(
        &mut self,
        from: Square,
        to: Square,
        lifted: Option<Square>,
    ) -> Option<Simulation<'_>> {
        let moved = self.squares[from.index()].take()?;
        let lifted = lifted.map(|sq| (sq, self.squares[sq.index()].take()));
        let displaced = self.squares[to.index()].replace(moved);
        Some(Simulation {
            board: self,
            from,
            to,
            moved,
            displaced,
            lifted,
        })
    }

    // -----------------------------------------------------------------------
    // FEN piece placement
    // -----------------------------------------------------------------------

    /// Parse the piece-placement field of a FEN string.
    pub fn from_fen_placement(field: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceType::from_char(ch) {
                    if kind == PieceType::Pawn && (rank == 0 || rank == 7) {
                        return Err(ChessError::InvalidFen(format!(
                            "pawn on back rank {}",
                            rank + 1
                        )));
                    }
                    board.spawn(Square::from_file_rank(file, rank), color, kind);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        for color in Color::BOTH {
            let kings = board
                .pieces()
                .filter(|(_, p)| p.is(color, PieceType::King))
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {kings} kings (expected 1)"
                )));
            }
        }

        Ok(board)
    }

    /// Export the piece placement as a FEN field.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.get(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.kind.to_char(piece.color));
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let ch = match self.get(Square::from_file_rank(file, rank)) {
                    Some(p) => p.kind.to_char(p.color),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Simulation guard
// ---------------------------------------------------------------------------

/// A board with one move tentatively applied. Dropping it restores the board.
pub struct Simulation<'a> {
    board: &'a mut Board,
    from: Square,
    to: Square,
    moved: Piece,
    displaced: Option<Piece>,
    lifted: Option<(Square, Option<Piece>)>,
}

impl Deref for Simulation<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        let squares = &mut self.board.squares;
        squares[self.to.index()] = self.displaced.take();
        if let Some((sq, piece)) = self.lifted.take() {
            squares[sq.index()] = piece;
        }
        squares[self.from.index()] = Some(self.moved);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
