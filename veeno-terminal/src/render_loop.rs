/// Fixed-rate frame loop with external cancellation
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable handle that stops a running [`RenderLoop`] from anywhere
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Timing information handed to each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Seconds since `start` was called
    pub now: f64,
    /// Frames per second measured over the last second
    pub fps: f32,
    pub frame: u64,
}

pub struct RenderLoop {
    target_frame_time: Duration,
    handle: LoopHandle,
    frame_count: u32,
    last_sample: Instant,
    fps: f32,
}

impl RenderLoop {
    pub fn new(fps: u32) -> Self {
        Self {
            target_frame_time: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            handle: LoopHandle::default(),
            frame_count: 0,
            last_sample: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Run `frame` at the target rate until the loop is stopped or `frame`
    /// fails
    pub fn start<E>(&mut self, mut frame: impl FnMut(FrameInfo) -> Result<(), E>) -> Result<(), E> {
        self.handle.running.store(true, Ordering::SeqCst);
        let start = Instant::now();
        self.last_sample = start;
        self.frame_count = 0;
        let mut total_frames = 0u64;

        while self.handle.is_running() {
            let frame_start = Instant::now();

            let info = FrameInfo {
                now: (frame_start - start).as_secs_f64(),
                fps: self.fps,
                frame: total_frames,
            };
            if let Err(error) = frame(info) {
                self.stop();
                return Err(error);
            }
            total_frames += 1;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time && self.handle.is_running() {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_sample = now;
            }
        }

        tracing::debug!(frames = total_frames, "render loop stopped");
        Ok(())
    }

    pub fn stop(&self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_frame_can_stop_the_loop() {
        let mut render_loop = RenderLoop::new(1000);
        let handle = render_loop.handle();
        let mut frames = 0;
        render_loop
            .start(|info| {
                assert_eq!(info.frame, frames);
                frames += 1;
                if frames == 5 {
                    handle.cancel();
                }
                Ok::<_, ()>(())
            })
            .unwrap();
        assert_eq!(frames, 5);
        assert!(!render_loop.handle().is_running());
    }

    #[test]
    fn test_error_stops_the_loop() {
        let mut render_loop = RenderLoop::new(1000);
        let result = render_loop.start(|info| if info.frame == 2 { Err("boom") } else { Ok(()) });
        assert_eq!(result, Err("boom"));
        assert!(!render_loop.handle().is_running());
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let mut render_loop = RenderLoop::new(200);
        let handle = render_loop.handle();
        let canceller = thread::spawn(move || {
            while !handle.is_running() {
                thread::yield_now();
            }
            thread::sleep(Duration::from_millis(30));
            handle.cancel();
        });
        let mut last_now = 0.0;
        render_loop
            .start(|info| {
                assert!(info.now >= last_now);
                last_now = info.now;
                Ok::<_, ()>(())
            })
            .unwrap();
        canceller.join().unwrap();
        assert!(last_now > 0.0);
    }
}
