
use ash::vk;

use crate::context::{VkDevice, VkObjectDiscardable};
use crate::ci::VkObjectBuildableCI;
use crate::error::VkResult;

/// A device-level handle remembered by `DiscardStack`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeviceObject {
    Semaphore(vk::Semaphore),
    Fence(vk::Fence),
    CommandPool(vk::CommandPool),
    ShaderModule(vk::ShaderModule),
    PipelineLayout(vk::PipelineLayout),
    Pipeline(vk::Pipeline),
    RenderPass(vk::RenderPass),
    Framebuffer(vk::Framebuffer),
}

macro_rules! impl_device_object {
    ($($handle:ident),+) => {
        $(
            impl From<vk::$handle> for DeviceObject {
                fn from(handle: vk::$handle) -> DeviceObject {
                    DeviceObject::$handle(handle)
                }
            }
        )+

        impl VkObjectDiscardable for DeviceObject {

            fn discard(self, device: &VkDevice) {
                match self {
                    $(| DeviceObject::$handle(handle) => device.discard(handle),)+
                }
            }
        }
    };
}

impl_device_object!(Semaphore, Fence, CommandPool, ShaderModule, PipelineLayout, Pipeline, RenderPass, Framebuffer);

/// Keeps the device objects in their creation order, to destroy them in the reverse one.
///
/// Use `build` or `track` during initialization: when a step fails, every object created before it is
/// destroyed before the error is returned. Once initialized, `unwind` releases everything at teardown.
#[derive(Debug, Default)]
pub struct DiscardStack {

    objects: Vec<DeviceObject>,
}

impl DiscardStack {

    pub fn new() -> DiscardStack {
        DiscardStack::default()
    }

    pub fn push(&mut self, object: impl Into<DeviceObject>) {
        self.objects.push(object.into());
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Build the object and remember it, or unwind the whole stack if the creation failed.
    pub fn build<T>(&mut self, device: &VkDevice, ci: &T) -> VkResult<T::ObjectType>
        where
            T: VkObjectBuildableCI,
            T::ObjectType: Into<DeviceObject> + Copy {

        let result = ci.build(device);
        self.track(device, result)
    }

    /// Remember the created object, or unwind the whole stack if `result` is an error.
    pub fn track<T>(&mut self, device: &VkDevice, result: VkResult<T>) -> VkResult<T>
        where
            T: Into<DeviceObject> + Copy {

        self.track_with(result, |object| device.discard(object))
    }

    pub(crate) fn track_with<T>(&mut self, result: VkResult<T>, discard: impl FnMut(DeviceObject)) -> VkResult<T>
        where
            T: Into<DeviceObject> + Copy {

        match result {
            | Ok(object) => {
                self.push(object);
                Ok(object)
            },
            | Err(e) => {
                log::warn!("Initialization failed, releasing {} object(s) created before it.", self.len());
                self.unwind_with(discard);
                Err(e)
            },
        }
    }

    /// Destroy all the objects, the last created first.
    pub fn unwind(&mut self, device: &VkDevice) {
        self.unwind_with(|object| device.discard(object));
    }

    pub(crate) fn unwind_with(&mut self, mut discard: impl FnMut(DeviceObject)) {

        while let Some(object) = self.objects.pop() {
            discard(object);
        }
    }
}

impl Drop for DiscardStack {

    fn drop(&mut self) {
        if !self.objects.is_empty() {
            log::warn!("{} device object(s) dropped without being destroyed.", self.objects.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn unwinds_in_reverse_creation_order() {
        let mut stack = DiscardStack::new();
        stack.push(vk::RenderPass::from_raw(1));
        stack.push(vk::PipelineLayout::from_raw(2));
        stack.push(vk::Pipeline::from_raw(3));
        stack.push(vk::Framebuffer::from_raw(4));
        assert_eq!(stack.len(), 4);

        let mut discarded = Vec::new();
        stack.unwind_with(|object| discarded.push(object));

        assert_eq!(discarded, vec![
            DeviceObject::Framebuffer(vk::Framebuffer::from_raw(4)),
            DeviceObject::Pipeline(vk::Pipeline::from_raw(3)),
            DeviceObject::PipelineLayout(vk::PipelineLayout::from_raw(2)),
            DeviceObject::RenderPass(vk::RenderPass::from_raw(1)),
        ]);
        assert!(stack.is_empty());
    }

    #[test]
    fn failed_step_releases_only_the_objects_built_before_it() {
        let mut stack = DiscardStack::new();
        let mut discarded = Vec::new();

        let render_pass = stack.track_with(Ok(vk::RenderPass::from_raw(1)), |object| discarded.push(object)).unwrap();
        assert_eq!(render_pass, vk::RenderPass::from_raw(1));
        stack.track_with(Ok(vk::PipelineLayout::from_raw(2)), |object| discarded.push(object)).unwrap();
        stack.track_with(Ok(vk::Pipeline::from_raw(3)), |object| discarded.push(object)).unwrap();
        assert!(discarded.is_empty());

        let failed: VkResult<vk::Framebuffer> = Err(crate::VkError::create("Framebuffer"));
        let result = stack.track_with(failed, |object| discarded.push(object));

        match result {
            | Err(e) => assert!(matches!(e.kind(), crate::VkErrorKind::Create { .. })),
            | Ok(_) => panic!("the failed step must return its error"),
        }
        assert_eq!(discarded, vec![
            DeviceObject::Pipeline(vk::Pipeline::from_raw(3)),
            DeviceObject::PipelineLayout(vk::PipelineLayout::from_raw(2)),
            DeviceObject::RenderPass(vk::RenderPass::from_raw(1)),
        ]);
        assert!(stack.is_empty());
    }

    #[test]
    fn failure_on_the_first_step_releases_nothing() {
        let mut stack = DiscardStack::new();
        let mut count = 0;

        let failed: VkResult<vk::RenderPass> = Err(crate::VkError::create("Render Pass"));
        assert!(stack.track_with(failed, |_| count += 1).is_err());
        assert_eq!(count, 0);
    }

    #[test]
    fn unwinding_twice_discards_nothing() {
        let mut stack = DiscardStack::new();
        stack.push(vk::Fence::from_raw(7));

        let mut count = 0;
        stack.unwind_with(|_| count += 1);
        stack.unwind_with(|_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn handles_convert_to_their_variant() {
        assert_eq!(DeviceObject::from(vk::Semaphore::from_raw(5)), DeviceObject::Semaphore(vk::Semaphore::from_raw(5)));
        assert_eq!(DeviceObject::from(vk::CommandPool::from_raw(6)), DeviceObject::CommandPool(vk::CommandPool::from_raw(6)));
        assert_eq!(DeviceObject::from(vk::ShaderModule::from_raw(8)), DeviceObject::ShaderModule(vk::ShaderModule::from_raw(8)));
    }
}
