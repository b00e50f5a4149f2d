
use ash::vk;
use winit::event::{Event, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::platform::run_return::EventLoopExtRunReturn;

use crate::context::{VulkanContext, VkDevice, VkObjectWaitable, SwapchainSyncError, DeviceObject};
use crate::ci::sync::{SemaphoreCI, FenceCI, reset_fence};
use crate::workflow::Workflow;
use crate::workflow::window::WindowContext;
use crate::input::EventController;
use crate::utils::time::VkTimeDuration;
use crate::utils::frame::{FrameCounter, FrameAction};
use crate::error::{VkResult, VkError};
use crate::vkuint;

/// Owns the window and the Vulkan context, and drives a `Workflow` until the window closes.
pub struct ProcPipeline {

    window: WindowContext,
    vulkan: VulkanContext,

    syncs: SyncResource,

    frame_counter: FrameCounter,
    swapchain_status: SwapchainStatus,
}

impl ProcPipeline {

    /// Take over the window and context. If the loop objects fail to be created, the context is destroyed before returning.
    pub fn new(window: WindowContext, vulkan: VulkanContext) -> VkResult<ProcPipeline> {

        let syncs = match SyncResource::new(&vulkan.device) {
            | Ok(syncs) => syncs,
            | Err(e) => {
                vulkan.discard();
                return Err(e)
            },
        };

        let target = ProcPipeline {
            window, vulkan, syncs,
            frame_counter: FrameCounter::new(),
            swapchain_status: SwapchainStatus::default(),
        };
        Ok(target)
    }

    /// Run the render loop, then destroy everything, the reverse of the creation order.
    ///
    /// An error from the workflow or from a frame is returned only after the teardown finished.
    pub fn launch(mut self, mut app: impl Workflow) -> VkResult<()> {

        let result = app.init(&self.vulkan.device, &self.vulkan.swapchain).and_then(|()| {

            let loop_result = self.main_loop(&mut app);
            log::info!("Render loop finished: {} frame(s) rendered, {} skipped.",
                self.frame_counter.rendered_count(), self.frame_counter.skipped_count());

            // nothing can be destroyed while the device still uses it.
            let idle_result = self.vulkan.wait_idle();
            if let Err(ref e) = idle_result {
                log::error!("{}", e);
            }

            loop_result.and(idle_result)
        });

        let device = &self.vulkan.device;
        let syncs = &self.syncs;
        release_after_loop(|| app.deinit(device), || syncs.discard(device));

        self.vulkan.discard();
        result
    }

    fn main_loop(&mut self, app: &mut impl Workflow) -> VkResult<()> {

        let mut event_handler = EventController::default();
        let mut loop_result = Ok(());

        let vulkan = &self.vulkan;
        let syncs = &self.syncs;
        let frame_counter = &mut self.frame_counter;
        let swapchain_status = &mut self.swapchain_status;

        self.window.event_loop.run_return(|event, _, control_flow| {

            *control_flow = ControlFlow::Poll;

            match event {
                | Event::WindowEvent { event, .. } => {
                    event_handler.record_event(&event);
                    if let WindowEvent::CloseRequested = event {
                        log::info!("Window close requested.");
                    }
                },
                | Event::MainEventsCleared => {

                    if event_handler.take_resized() {
                        log::info!("Window resized, the swapchain keeps its original extent.");
                    }

                    let action = match event_handler.current_action() {
                        | FrameAction::Terminal => FrameAction::Terminal,
                        | _ => app.receive_input(&event_handler),
                    };

                    if action == FrameAction::Terminal {
                        *control_flow = ControlFlow::Exit;
                        return
                    }

                    match render_frame(vulkan, syncs, app, swapchain_status) {
                        | Ok(action) => {
                            frame_counter.tick_frame(action);
                        },
                        | Err(e) => {
                            log::error!("Failed to render frame: {}", e);
                            loop_result = Err(e);
                            *control_flow = ControlFlow::Exit;
                        },
                    }

                    event_handler.tick_frame();
                },
                | _ => (),
            }
        });

        loop_result
    }
}

/// Release what was created after the context, the reverse of the creation order:
/// the workflow objects (created in `init`) before the loop's sync objects (created in `ProcPipeline::new`).
fn release_after_loop(deinit_workflow: impl FnOnce(), discard_syncs: impl FnOnce()) {
    deinit_workflow();
    discard_syncs();
}

fn render_frame(vulkan: &VulkanContext, syncs: &SyncResource, app: &mut impl Workflow, status: &mut SwapchainStatus) -> VkResult<FrameAction> {

    // wait and acquire next image. -------------------------------------
    syncs.in_flight.wait(&vulkan.device, VkTimeDuration::Infinite)?;

    let image_index = match status.on_acquire(vulkan.swapchain.next_image(syncs.image_available))? {
        | Some(image_index) => image_index,
        // the fence stays signaled, so the next frame does not wait forever.
        | None => return Ok(FrameAction::SwapchainOutdated),
    };

    reset_fence(&vulkan.device, syncs.in_flight)?;
    // ------------------------------------------------------------------

    // record and submit the commands of this frame. --------------------
    let render_finished = app.render_frame(&vulkan.device, syncs.in_flight, syncs.image_available, image_index as _)?;
    // ------------------------------------------------------------------

    // present image. ---------------------------------------------------
    status.on_present(vulkan.swapchain.present(&[render_finished], image_index))?;
    // ------------------------------------------------------------------

    Ok(FrameAction::Rendering)
}

/// Decides what the loop does with the result of acquiring or presenting a swapchain image.
///
/// The swapchain is never recreated, so a mismatch with the surface is reported once and then tolerated.
#[derive(Debug, Default)]
struct SwapchainStatus {

    is_suboptimal_reported: bool,
    is_outdated_reported: bool,
}

impl SwapchainStatus {

    /// Return the index of the image to render, or `None` if the frame must be skipped before touching the fence.
    fn on_acquire(&mut self, result: Result<vkuint, SwapchainSyncError>) -> VkResult<Option<vkuint>> {

        match result {
            | Ok(image_index) => Ok(Some(image_index)),
            | Err(SwapchainSyncError::SubOptimal(image_index)) => {
                // the image was acquired and the semaphore will be signaled, so it is still rendered.
                self.report_suboptimal();
                Ok(Some(image_index))
            },
            | Err(SwapchainSyncError::SurfaceOutDate) => {
                self.report_outdated();
                Ok(None)
            },
            | Err(e) => Err(VkError::other(format!("Failed to acquire swapchain image: {}", e))),
        }
    }

    fn on_present(&mut self, result: Result<(), SwapchainSyncError>) -> VkResult<()> {

        match result {
            | Ok(()) => Ok(()),
            | Err(SwapchainSyncError::SubOptimal(_)) => {
                self.report_suboptimal();
                Ok(())
            },
            | Err(SwapchainSyncError::SurfaceOutDate) => {
                self.report_outdated();
                Ok(())
            },
            | Err(e) => Err(VkError::other(format!("Failed to present swapchain image: {}", e))),
        }
    }

    fn report_suboptimal(&mut self) {
        if !self.is_suboptimal_reported {
            log::warn!("Swapchain is sub-optimal for the surface.");
            self.is_suboptimal_reported = true;
        }
    }

    fn report_outdated(&mut self) {
        if !self.is_outdated_reported {
            log::warn!("Swapchain is out of date, frames are skipped until the surface matches it again.");
            self.is_outdated_reported = true;
        }
    }
}

/// The synchronization objects of the single frame in flight.
struct SyncResource {

    /// signaled when an image is acquired, waited by the rendering.
    image_available: vk::Semaphore,
    /// signaled when the device finishes the commands of a frame.
    in_flight: vk::Fence,
}

impl SyncResource {

    fn new(device: &VkDevice) -> VkResult<SyncResource> {

        let image_available = device.build(&SemaphoreCI::new())?;
        // created signaled, so the first frame does not wait forever.
        let in_flight = match device.build(&FenceCI::new(true)) {
            | Ok(fence) => fence,
            | Err(e) => {
                device.discard(image_available);
                return Err(e)
            },
        };

        let syncs = SyncResource { image_available, in_flight };
        Ok(syncs)
    }

    fn discard(&self, device: &VkDevice) {
        self.discard_with(|object| device.discard(object));
    }

    /// `image_available` is created first, so it goes last.
    fn discard_with(&self, mut discard: impl FnMut(DeviceObject)) {
        discard(DeviceObject::from(self.in_flight));
        discard(DeviceObject::from(self.image_available));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;
    use std::cell::RefCell;

    #[test]
    fn workflow_objects_are_released_before_the_loop_objects() {
        let syncs = SyncResource {
            image_available: vk::Semaphore::from_raw(1),
            in_flight: vk::Fence::from_raw(2),
        };
        let released = RefCell::new(Vec::new());

        release_after_loop(
            || released.borrow_mut().push(DeviceObject::Pipeline(vk::Pipeline::from_raw(3))),
            || syncs.discard_with(|object| released.borrow_mut().push(object)),
        );

        assert_eq!(released.into_inner(), vec![
            DeviceObject::Pipeline(vk::Pipeline::from_raw(3)),
            DeviceObject::Fence(vk::Fence::from_raw(2)),
            DeviceObject::Semaphore(vk::Semaphore::from_raw(1)),
        ]);
    }

    #[test]
    fn acquired_image_is_rendered() {
        let mut status = SwapchainStatus::default();
        assert_eq!(status.on_acquire(Ok(2)).unwrap(), Some(2));
        assert!(!status.is_suboptimal_reported);
        assert!(!status.is_outdated_reported);
    }

    #[test]
    fn out_of_date_acquire_skips_the_frame() {
        let mut status = SwapchainStatus::default();

        assert_eq!(status.on_acquire(Err(SwapchainSyncError::SurfaceOutDate)).unwrap(), None);
        assert!(status.is_outdated_reported);

        // reported once, every later frame is skipped as well.
        assert_eq!(status.on_acquire(Err(SwapchainSyncError::SurfaceOutDate)).unwrap(), None);
        assert!(status.is_outdated_reported);
    }

    #[test]
    fn suboptimal_acquire_still_renders_the_image() {
        let mut status = SwapchainStatus::default();

        assert_eq!(status.on_acquire(Err(SwapchainSyncError::SubOptimal(1))).unwrap(), Some(1));
        assert!(status.is_suboptimal_reported);
        assert_eq!(status.on_acquire(Err(SwapchainSyncError::SubOptimal(0))).unwrap(), Some(0));
    }

    #[test]
    fn other_acquire_errors_are_fatal() {
        let mut status = SwapchainStatus::default();

        assert!(status.on_acquire(Err(SwapchainSyncError::TimeOut)).is_err());
        assert!(status.on_acquire(Err(SwapchainSyncError::Unknown(vk::Result::ERROR_DEVICE_LOST))).is_err());
        assert!(!status.is_outdated_reported);
    }

    #[test]
    fn present_tolerates_a_mismatched_surface_only() {
        let mut status = SwapchainStatus::default();

        assert!(status.on_present(Ok(())).is_ok());
        assert!(status.on_present(Err(SwapchainSyncError::SubOptimal(0))).is_ok());
        assert!(status.on_present(Err(SwapchainSyncError::SurfaceOutDate)).is_ok());
        assert!(status.is_suboptimal_reported && status.is_outdated_reported);

        assert!(status.on_present(Err(SwapchainSyncError::Unknown(vk::Result::ERROR_SURFACE_LOST_KHR))).is_err());
    }
}
