use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use duel_tetris::core::{RulesConfig, Versus};
use duel_tetris::term::{BoardPanel, FrameBuffer, GameView, Viewport};
use duel_tetris::types::PlayerSide;

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn versus_frame_loop_is_allocation_free_after_warmup() {
    let view = GameView::default();
    let viewport = Viewport::new(80, 30);
    let mut fb = FrameBuffer::new(viewport.width, viewport.height);

    let mut versus = Versus::with_seeds(RulesConfig::default(), 1, 2);
    let mut left = versus.player(PlayerSide::One).snapshot();
    let mut right = versus.player(PlayerSide::Two).snapshot();

    // Warm-up.
    view.render_versus_into(
        BoardPanel::new("PLAYER 1", &left),
        BoardPanel::new("PLAYER 2", &right),
        Some("Esc: quit"),
        viewport,
        &mut fb,
    );

    // Gravity only: nothing locks within these frames.
    let allocs = with_alloc_counting(|| {
        for _ in 0..120 {
            versus.step(16);
            versus.player(PlayerSide::One).snapshot_into(&mut left);
            versus.player(PlayerSide::Two).snapshot_into(&mut right);
            view.render_versus_into(
                BoardPanel::new("PLAYER 1", &left),
                BoardPanel::new("PLAYER 2", &right),
                Some("Esc: quit"),
                viewport,
                &mut fb,
            );
        }
    });

    assert!(allocs == 0);
}
