//! Plain-text rendering of views and change logs for the replay driver.

use transfer_tray::board::TransferBoard;
use transfer_tray::transfer::{ListChange, TransferEventSink, TransferFilter};

/// Render one view as a header plus one line per row.
///
/// ```text
/// all (2)
///   0  #2 b.txt [upload] 0 B / 10 B @ 0 B/s
///   1  #1 a.txt [download] 50 B / 100 B @ 5 B/s
/// ```
pub fn render_view(view: &TransferEventSink) -> String {
    let index = view.index();
    let mut out = format!("{} ({})\n", view.filter(), index.count());
    if index.is_empty() {
        out.push_str("  (empty)\n");
    }
    for (row, record) in index.iter().enumerate() {
        out.push_str(&format!("  {:<3}{}\n", row, record.summary()));
    }
    out
}

pub fn print_board(board: &TransferBoard) {
    for view in board.views() {
        print!("{}", render_view(view));
    }
}

pub fn print_changes(filter: TransferFilter, changes: &[ListChange]) {
    println!("changes [{}]", filter);
    for change in changes {
        println!("  {}", change);
    }
}
